//! Anti-affinity grouping of VMs by name prefix.

/// Strips trailing decimal digits from a VM name to derive its anti-affinity group prefix.
/// Falls back to the original name if stripping would yield an empty string.
pub fn prefix_of(vm_name: &str) -> &str {
    let trimmed = vm_name.trim_end_matches(|c: char| c.is_ascii_digit());
    if trimmed.is_empty() {
        vm_name
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_digits() {
        assert_eq!(prefix_of("appvm01"), "appvm");
        assert_eq!(prefix_of("appvm123"), "appvm");
        assert_eq!(prefix_of("web"), "web");
    }

    #[test]
    fn falls_back_to_original_name_when_all_digits() {
        assert_eq!(prefix_of("123"), "123");
    }
}
