//! Cache key generation for memoized method calls

use std::fmt::{Debug, Display};

/// Builds a cache key from the call being cached
pub trait KeyGenerator: Send + Sync + Debug {
    fn generate(&self, target: &str, method: &str, params: &[&dyn Display]) -> String;
}

/// Concatenates target, method name and every parameter, without separators
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleKeyGenerator;

impl KeyGenerator for SimpleKeyGenerator {
    fn generate(&self, target: &str, method: &str, params: &[&dyn Display]) -> String {
        let mut key = String::with_capacity(target.len() + method.len());
        key.push_str(target);
        key.push_str(method);
        for param in params {
            key.push_str(&param.to_string());
        }
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concatenates_without_separators() {
        let generator = SimpleKeyGenerator;
        let key = generator.generate("app::UserService", "find_by_id", &[&42, &"eu"]);
        assert_eq!(key, "app::UserServicefind_by_id42eu");
    }

    #[test]
    fn test_no_params() {
        let key = SimpleKeyGenerator.generate("Service", "list", &[]);
        assert_eq!(key, "Servicelist");
    }
}
