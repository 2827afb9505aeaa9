//! Individual constraint checks

mod complexity;
mod documentation;
mod forbidden;
mod interface;
mod syntax;

pub use complexity::ComplexityCheck;
pub use documentation::DocumentationCheck;
pub use forbidden::ForbiddenCheck;
pub use interface::InterfaceCheck;
pub use syntax::SyntaxCheck;

use crate::violation::Violation;
use exforge_core::ast::{ExtractorDocument, Step};

/// A static check over candidate source
///
/// `document` is `None` when the source did not parse; checks other than
/// syntax return nothing in that case.
pub trait Check: Send + Sync {
    /// Stable identifier, also the prefix of the rule ids it reports
    fn id(&self) -> &'static str;

    fn run(&self, source: &str, document: Option<&ExtractorDocument>) -> Vec<Violation>;
}

/// Visit every step of a step list with its path (`steps[1].then[0]`)
pub(crate) fn walk_steps<'a>(steps: &'a [Step], prefix: &str, visit: &mut dyn FnMut(&'a Step, &str)) {
    for (idx, step) in steps.iter().enumerate() {
        let path = format!("{}[{}]", prefix, idx);
        visit(step, &path);
        match step {
            Step::If {
                then, otherwise, ..
            } => {
                walk_steps(then, &format!("{}.then", path), visit);
                walk_steps(otherwise, &format!("{}.else", path), visit);
            }
            Step::ForEach { steps, .. } => {
                walk_steps(steps, &format!("{}.steps", path), visit);
            }
            Step::Set { .. } | Step::Invoke { .. } => {}
        }
    }
}
