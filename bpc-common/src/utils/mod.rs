// private sub-module defined in other files
mod byte_order_reader;
mod byte_order_writer;

// exports identifiers from private sub-modules in the current module namespace
pub use self::byte_order_reader::ByteOrderReader;
pub use self::byte_order_reader::Endianness;
pub use self::byte_order_writer::ByteOrderWriter;

use std::path::{Path, PathBuf};
use std::time::Instant;

/// Returns a formatted string of elapsed time, e.g.
/// `1min 34.852s`
pub fn get_formatted_elapsed_time(instant: Instant) -> String {
    let dur = instant.elapsed();
    let minutes = dur.as_secs() / 60;
    let sub_sec = dur.as_secs() % 60;
    let sub_milli = dur.subsec_millis();
    if minutes > 0 {
        return format!("{}min {}.{:03}s", minutes, sub_sec, sub_milli);
    }
    format!("{}.{:03}s", sub_sec, sub_milli)
}

/// Formats a float the way a shortest round-trip repr does, always keeping a
/// fractional part, e.g. `5.0`, `-0.25`, `412345.125`.
pub fn float_repr(value: f64) -> String {
    format!("{:?}", value)
}

/// Resolves a possibly relative file name against the working directory.
pub fn resolve_path(file_name: &str, working_directory: &str) -> PathBuf {
    let p = Path::new(file_name);
    if p.is_absolute() || working_directory.is_empty() {
        return p.to_path_buf();
    }
    Path::new(working_directory).join(p)
}

#[cfg(test)]
mod test {
    use super::{float_repr, resolve_path};
    use std::path::PathBuf;

    #[test]
    fn test_float_repr() {
        assert_eq!(float_repr(5.0), "5.0");
        assert_eq!(float_repr(-0.25), "-0.25");
        assert_eq!(float_repr(412345.125), "412345.125");
    }

    #[test]
    fn test_resolve_path() {
        assert_eq!(resolve_path("a.json", ""), PathBuf::from("a.json"));
        assert_eq!(
            resolve_path("a.json", "/data/work"),
            PathBuf::from("/data/work/a.json")
        );
        assert_eq!(resolve_path("/tmp/a.json", "/data"), PathBuf::from("/tmp/a.json"));
    }
}
