//! Phone-key normalization.
//!
//! Duplicate detection matches on digits only, so `+1 (555) 111-2222` and
//! `555.111.2222` group together once the country prefix lines up.

/// Reduce a raw phone string to its ASCII digits.
///
/// Total over any input. An empty result means the record has no usable
/// phone key and is excluded from phone grouping.
pub fn normalize_phone(raw: &str) -> String {
  raw.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strips_formatting() {
    assert_eq!(normalize_phone("+1 (555) 111-2222"), "15551112222");
    assert_eq!(normalize_phone("555.111.2222"), "5551112222");
  }

  #[test]
  fn no_digits_yields_empty() {
    assert_eq!(normalize_phone(""), "");
    assert_eq!(normalize_phone("n/a"), "");
    assert_eq!(normalize_phone("call me"), "");
  }

  #[test]
  fn keeps_digits_among_letters() {
    assert_eq!(normalize_phone("ext. 42 then 7"), "427");
  }
}
