// Candidate filters applied before scoring
use crate::candidate::CandidateItem;
use crate::constraints::AvoidList;

pub trait Filter {
    fn matches(&self, item: &CandidateItem) -> bool;
}

#[derive(Debug, Clone)]
pub enum FilterCondition {
    /// Drop rows whose flag is present and false. Rows without the flag pass.
    DietaryFlag { flag: String },
    /// Keep rows whose region is in the allow-list (case-insensitive)
    RegionIn(Vec<String>),
    /// Drop rows whose title contains any term's stem
    TitleExcludes(AvoidList),
    And(Vec<FilterCondition>),
}

impl FilterCondition {
    fn matches_condition(condition: &FilterCondition, item: &CandidateItem) -> bool {
        match condition {
            FilterCondition::DietaryFlag { flag } => item.flag(flag).unwrap_or(true),
            FilterCondition::RegionIn(regions) => item
                .region
                .as_deref()
                .map(|r| regions.iter().any(|allowed| allowed.eq_ignore_ascii_case(r)))
                .unwrap_or(false),
            FilterCondition::TitleExcludes(terms) => !terms.matches(&item.title),
            FilterCondition::And(conditions) => {
                conditions.iter().all(|c| Self::matches_condition(c, item))
            }
        }
    }
}

impl Filter for FilterCondition {
    fn matches(&self, item: &CandidateItem) -> bool {
        Self::matches_condition(self, item)
    }
}
