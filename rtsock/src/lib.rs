pub mod classify;
pub mod consts;
pub mod core;
pub mod error;
pub mod handle;
pub mod sweep;
pub mod types;

pub use error::RouteError;

pub fn align_of(len: usize, align_to: usize) -> usize {
    (len + align_to - 1) & !(align_to - 1)
}

/// Space a socket address of `len` bytes occupies inside a route message.
/// Zero-length addresses still take one word.
pub fn roundup(len: usize) -> usize {
    match len {
        0 => consts::SA_ALIGN_TO,
        len => align_of(len, consts::SA_ALIGN_TO),
    }
}

pub fn is_privileged() -> bool {
    nix::unistd::geteuid().is_root()
}

#[macro_export]
macro_rules! test_setup {
    () => {
        if !$crate::is_privileged() {
            eprintln!("test skipped, requires root");
            return;
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() {
        assert_eq!(align_of(0x10, 0x4), 0x10);
    }

    #[test]
    fn test_roundup_zero_takes_a_word() {
        assert_eq!(roundup(0), 4);
    }

    #[test]
    fn test_roundup_is_smallest_word_multiple() {
        for n in 1..=512usize {
            let r = roundup(n);
            assert_eq!(r % consts::SA_ALIGN_TO, 0, "n = {n}");
            assert!(r >= n, "n = {n}");
            assert!(r - n < consts::SA_ALIGN_TO, "n = {n}");
        }
    }

    #[test]
    fn test_roundup_matches_kernel_macro() {
        // 1 + ((n - 1) | (sizeof(int) - 1))
        for n in 1..=256usize {
            assert_eq!(roundup(n), 1 + ((n - 1) | 3));
        }
    }
}
