use std::collections::HashSet;

use crate::model::RepositoryResult;

/// Usernames that were requested but have no result, in request order.
pub fn not_found(requested: &[String], results: &[RepositoryResult]) -> Vec<String> {
    let returned: HashSet<&str> = results.iter().map(|r| r.username.as_str()).collect();

    let mut missing: Vec<String> = Vec::new();
    for username in requested {
        if !returned.contains(username.as_str()) && !missing.contains(username) {
            missing.push(username.clone());
        }
    }
    missing
}
