use std::fmt::Debug;

use thiserror::Error;

/// Errors raised by algorithms that only make sense on a DAG.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error<V: Debug> {
    /// The digraph is not acyclic.  Carries one witness cycle: a closed walk
    /// whose first and last vertices are equal.
    #[error("digraph has a cycle: {}", display_cycle(.0))]
    Cycle(Vec<V>),

    /// The number of paths doesn't fit in a `u64`.  Path counts grow
    /// exponentially with the number of stacked diamonds.
    #[error("path count overflows u64")]
    PathCountOverflow,
}

pub type Result<T, V> = std::result::Result<T, Error<V>>;

fn display_cycle<V: Debug>(cycle: &[V]) -> String {
    cycle
        .iter()
        .map(|vertex| format!("{:?}", vertex))
        .collect::<Vec<String>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_lists_the_witness() {
        let error: Error<&str> = Error::Cycle(vec!["a", "b", "a"]);
        assert_eq!(
            error.to_string(),
            "digraph has a cycle: \"a\" -> \"b\" -> \"a\""
        );
    }

    #[test]
    fn overflow_message() {
        let error: Error<u32> = Error::PathCountOverflow;
        assert_eq!(error.to_string(), "path count overflows u64");
    }
}
