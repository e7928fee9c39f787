//! Persona and strategy selection: maps résumé content to a prompt configuration.
//!
//! Both selectors are pure functions over fixed keyword tables. Matching is
//! case-insensitive substring search; tables mix Korean and English because
//! résumés arrive in either.

use crate::coaching::models::ResumeInput;

/// Interviewer framing injected at the top of every prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Persona {
    SeniorEngineer,
    TechLead,
    PlatformArchitect,
    StartupCto,
    FaangStaff,
}

impl Persona {
    pub fn as_str(self) -> &'static str {
        match self {
            Persona::SeniorEngineer => "senior_engineer",
            Persona::TechLead => "tech_lead",
            Persona::PlatformArchitect => "platform_architect",
            Persona::StartupCto => "startup_cto",
            Persona::FaangStaff => "faang_staff",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Persona::SeniorEngineer => {
                "a senior backend engineer and hiring interviewer with more than 15 years at Silicon Valley tech companies"
            }
            Persona::TechLead => {
                "a technical leader with 10 years of experience managing teams and designing architectures"
            }
            Persona::PlatformArchitect => {
                "a platform architect who has designed cloud-native infrastructure, container orchestration and infrastructure-as-code at scale"
            }
            Persona::StartupCto => {
                "the CTO of a fast-growing startup who balances technical challenges against business requirements"
            }
            Persona::FaangStaff => {
                "a staff-level distributed-systems engineer at a big-tech company who runs bar-raiser interviews"
            }
        }
    }
}

/// Question-emphasis profile. Controls worked examples and the checklist focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Balanced,
    TechnicalDeep,
    SystemDesign,
    BehavioralHeavy,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Balanced => "balanced",
            Strategy::TechnicalDeep => "technical_deep",
            Strategy::SystemDesign => "system_design",
            Strategy::BehavioralHeavy => "behavioral_heavy",
        }
    }

    /// Extra checklist line telling the oracle where to put its weight.
    pub fn focus(self) -> &'static str {
        match self {
            Strategy::Balanced => {
                "Balance the set: cover technical depth, system design, collaboration, problem solving and career vision evenly."
            }
            Strategy::TechnicalDeep => {
                "Weight the set toward technical deep-dives: internals, trade-offs and failure modes of the candidate's own stack."
            }
            Strategy::SystemDesign => {
                "Weight the set toward system design: scalability, distributed consistency, bottlenecks and architecture evolution."
            }
            Strategy::BehavioralHeavy => {
                "Weight the set toward behavioral evidence: leadership, mentoring, conflict resolution and decision ownership."
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Keyword tables
// ────────────────────────────────────────────────────────────────────────────

const BIG_TECH_EMPLOYERS: &[&str] = &[
    "google", "구글", "facebook", "meta platforms", "amazon", "아마존", "apple", "netflix",
    "microsoft", "naver", "네이버", "kakao", "카카오", "coupang", "쿠팡", "line corp",
];

const INFRA_KEYWORDS: &[&str] = &[
    "kubernetes", "k8s", "쿠버네티스", "aws", "gcp", "azure", "terraform", "ansible", "helm",
    "cloud", "클라우드", "인프라",
];

const STARTUP_KEYWORDS: &[&str] = &[
    "startup", "start-up", "스타트업", "early-stage", "early stage", "series a", "series b",
    "초기 창업",
];

const LEADERSHIP_KEYWORDS: &[&str] = &[
    "lead", "리드", "팀장", "manager", "매니저", "head of", "리딩", "관리",
];

const SYSTEM_DESIGN_KEYWORDS: &[&str] = &[
    "msa", "마이크로서비스", "아키텍처", "분산", "확장성", "성능", "microservice",
    "architecture", "distributed", "scalability", "performance",
];

/// Minimum distinct system-design hits in job duties.
const SYSTEM_DESIGN_MIN_HITS: usize = 2;

const ADVANCED_TECH: &[&str] = &[
    "kubernetes", "kafka", "redis", "elasticsearch", "docker", "terraform", "grpc", "graphql",
    "spark", "hadoop", "rabbitmq", "cassandra", "flink", "istio",
];

/// Minimum advanced technologies among the skills.
const ADVANCED_TECH_MIN_HITS: usize = 3;

const MENTORING_KEYWORDS: &[&str] = &[
    "관리", "리딩", "멘토링", "리드", "팀장", "lead", "mentor", "manage", "coaching", "코칭",
];

// ────────────────────────────────────────────────────────────────────────────
// Selection
// ────────────────────────────────────────────────────────────────────────────

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn distinct_hits(haystack: &str, needles: &[&str]) -> usize {
    needles.iter().filter(|n| haystack.contains(*n)).count()
}

/// Returns `explicit` when given, otherwise the first persona whose keyword
/// family appears in the résumé (big tech → infra → startup → leadership).
pub fn select_persona(resume: &ResumeInput, explicit: Option<Persona>) -> Persona {
    if let Some(persona) = explicit {
        return persona;
    }

    let text = resume.lowercase_text();
    if contains_any(&text, BIG_TECH_EMPLOYERS) {
        Persona::FaangStaff
    } else if contains_any(&text, INFRA_KEYWORDS) {
        Persona::PlatformArchitect
    } else if contains_any(&text, STARTUP_KEYWORDS) {
        Persona::StartupCto
    } else if contains_any(&text, LEADERSHIP_KEYWORDS) {
        Persona::TechLead
    } else {
        Persona::SeniorEngineer
    }
}

/// Returns `explicit` when given, otherwise derives the strategy from job
/// duties and skills.
pub fn select_strategy(resume: &ResumeInput, explicit: Option<Strategy>) -> Strategy {
    if let Some(strategy) = explicit {
        return strategy;
    }

    let duties = resume.job_duties.to_lowercase();
    if distinct_hits(&duties, SYSTEM_DESIGN_KEYWORDS) >= SYSTEM_DESIGN_MIN_HITS {
        return Strategy::SystemDesign;
    }

    let skills: Vec<String> = resume
        .technical_skills
        .iter()
        .map(|s| s.to_lowercase())
        .collect();
    let advanced = ADVANCED_TECH
        .iter()
        .filter(|tech| skills.iter().any(|s| s.contains(*tech)))
        .count();
    if advanced >= ADVANCED_TECH_MIN_HITS {
        return Strategy::TechnicalDeep;
    }

    if contains_any(&duties, MENTORING_KEYWORDS) {
        return Strategy::BehavioralHeavy;
    }

    Strategy::Balanced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coaching::models::fixtures::{resume, sample_resume};

    #[test]
    fn test_aws_and_kubernetes_select_platform_architect() {
        let r = resume("클라우드 엔지니어", "AWS 인프라 구축", &["AWS", "Docker", "Kubernetes"]);
        assert_eq!(select_persona(&r, None), Persona::PlatformArchitect);
    }

    #[test]
    fn test_startup_selects_startup_cto() {
        let r = resume("스타트업 백엔드 개발자", "빠른 개발", &["Node.js"]);
        assert_eq!(select_persona(&r, None), Persona::StartupCto);

        let r = resume("Backend developer at an early startup", "Shipping features", &["Go"]);
        assert_eq!(select_persona(&r, None), Persona::StartupCto);
    }

    #[test]
    fn test_leadership_selects_tech_lead() {
        let r = resume("팀 리드 개발자", "팀 관리", &["Java"]);
        assert_eq!(select_persona(&r, None), Persona::TechLead);

        let r = resume("Backend developer", "팀장으로 일정 조율", &["Java"]);
        assert_eq!(select_persona(&r, None), Persona::TechLead);

        let r = resume("Backend developer", "Lead a squad of four", &["Java"]);
        assert_eq!(select_persona(&r, None), Persona::TechLead);
    }

    #[test]
    fn test_big_tech_wins_over_infra() {
        let r = resume("Ex-Google SRE", "Ran Kubernetes fleets on AWS", &["Kubernetes"]);
        assert_eq!(select_persona(&r, None), Persona::FaangStaff);
    }

    #[test]
    fn test_default_persona_is_senior_engineer() {
        let r = resume("일반 개발자", "웹 개발", &["JavaScript"]);
        assert_eq!(select_persona(&r, None), Persona::SeniorEngineer);
    }

    #[test]
    fn test_explicit_persona_overrides_selection() {
        assert_eq!(
            select_persona(&sample_resume(), Some(Persona::FaangStaff)),
            Persona::FaangStaff
        );
    }

    #[test]
    fn test_two_design_keywords_select_system_design() {
        let r = resume("MSA 아키텍트", "마이크로서비스 아키텍처 설계, 분산 시스템 구축", &["MSA"]);
        assert_eq!(select_strategy(&r, None), Strategy::SystemDesign);

        let r = resume("Engineer", "MSA 전환 및 성능 개선", &["Java"]);
        assert_eq!(select_strategy(&r, None), Strategy::SystemDesign);
    }

    #[test]
    fn test_single_design_keyword_is_not_enough() {
        let r = resume("Engineer", "MSA 전환", &["Java"]);
        assert_eq!(select_strategy(&r, None), Strategy::Balanced);
    }

    #[test]
    fn test_advanced_stack_selects_technical_deep() {
        let r = resume("개발자", "개발", &["Kubernetes", "Kafka", "Redis", "Elasticsearch"]);
        assert_eq!(select_strategy(&r, None), Strategy::TechnicalDeep);
    }

    #[test]
    fn test_management_duties_select_behavioral_heavy() {
        let r = resume("개발자", "프로젝트 관리, 팀 리딩, 멘토링", &["Java"]);
        assert_eq!(select_strategy(&r, None), Strategy::BehavioralHeavy);
    }

    #[test]
    fn test_default_strategy_is_balanced() {
        let r = resume("개발자", "웹 개발", &["Python"]);
        assert_eq!(select_strategy(&r, None), Strategy::Balanced);
    }

    #[test]
    fn test_explicit_strategy_overrides_selection() {
        let r = resume("개발자", "웹 개발", &["Python"]);
        assert_eq!(
            select_strategy(&r, Some(Strategy::TechnicalDeep)),
            Strategy::TechnicalDeep
        );
    }
}
