//! Small helpers used across the crate.

/// Print a warning line to stderr, with source location.
#[macro_export]
macro_rules! warn {
    ($fmt:expr $(,$arg:expr)*) => {{
        use std::io::Write;
        let mut out = std::io::BufWriter::new(std::io::stderr().lock());
        let _ = write!(&mut out, "W: ");
        let _ = write!(&mut out, $fmt $(,$arg)*);
        let _ = writeln!(&mut out, " at {:?} line {}", file!(), line!());
        let _ = out.flush();
    }}
}

pub fn all_whitespace(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_all_whitespace() {
        assert!(all_whitespace(""));
        assert!(all_whitespace(" \t\n"));
        assert!(!all_whitespace(" x "));
    }
}
