use rand::Rng;

/// Generate a long-lived anonymous visitor id (UUID v4).
///
/// This is an analytics identifier, not a security token. Existing ids
/// stored client-side are reused directly and never recalculated.
pub fn generate_visitor_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Weaker generator used when the strong random path is unavailable.
///
/// The `v_` prefix keeps fallback ids visually distinguishable when
/// debugging. Collision probability is acceptable at analytics stakes.
pub fn fallback_visitor_id() -> String {
    format!("v_{}", random_alnum(16))
}

/// Generate a fresh session id (UUID v4).
pub fn generate_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn random_alnum(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| {
            let idx = rng.gen_range(0..36);
            if idx < 10 {
                (b'0' + idx) as char
            } else {
                (b'a' + idx - 10) as char
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visitor_id_is_uuid_shaped() {
        let id = generate_visitor_id();
        assert_eq!(id.len(), 36);
        assert_eq!(id.matches('-').count(), 4);
    }

    #[test]
    fn visitor_ids_are_unique() {
        assert_ne!(generate_visitor_id(), generate_visitor_id());
    }

    #[test]
    fn fallback_id_is_prefixed_and_alnum() {
        let id = fallback_visitor_id();
        assert!(id.starts_with("v_"));
        assert_eq!(id.len(), 18);
        assert!(id[2..].chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
