/// Storage key for a node's visit counter. `#` cannot start a script
/// variable name, so scripts can read the counter only through `visited`.
pub fn visited_variable_name(node: &str) -> String {
    format!("#visited:{}", node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_distinct_per_node() {
        assert_eq!(visited_variable_name("Start"), "#visited:Start");
        assert_ne!(visited_variable_name("A"), visited_variable_name("B"));
    }
}
