//! Session code generation.
//!
//! Codes are 6 characters from Crockford's Base32 alphabet (no I, L, O, U)
//! so they stay unambiguous when read aloud or typed.

use rand::Rng;

const CROCKFORD: &[u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";
const CODE_LEN: usize = 6;

pub fn generate_session_code() -> String {
    let mut rng = rand::rng();
    let mut code = String::with_capacity(CODE_LEN);
    for _ in 0..CODE_LEN {
        let idx = rng.random_range(0..CROCKFORD.len());
        code.push(CROCKFORD[idx] as char);
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_have_correct_length_and_charset() {
        let code = generate_session_code();
        assert_eq!(code.len(), 6);
        assert!(code.bytes().all(|b| CROCKFORD.contains(&b)));
    }

    #[test]
    fn codes_differ_between_calls() {
        // Collisions over 32^6 values are vanishingly unlikely here.
        let a = generate_session_code();
        let b = generate_session_code();
        assert_ne!(a, b);
    }
}
