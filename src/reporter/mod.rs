pub mod json;
pub mod terminal;

use crate::aggregator::Verdict;

pub trait Reporter {
    fn report(&self, verdict: &Verdict) -> String;
}
