//! Unique display-name allocation.
//!
//! Plugin names double as audio-port prefixes, so they must be distinct and
//! fit the transport's port-name budget.

/// Substituted for an empty proposed name.
pub const PLACEHOLDER_NAME: &str = "(No name)";

/// Derives the maximum display-name length from the transport's port-name size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameBudget {
    port_name_size: usize,
}

impl NameBudget {
    pub fn new(port_name_size: usize) -> Self {
        Self { port_name_size }
    }

    /// `shared_client_name` is the client prefix when all plugins share one
    /// audio connection; it eats into the same budget.
    pub fn max_len(&self, shared_client_name: Option<&str>) -> usize {
        let base = (self.port_name_size / 2).saturating_sub(5);
        let prefix = shared_client_name.map_or(0, |name| name.chars().count());
        base.saturating_sub(prefix).max(1)
    }
}

/// Returns `proposed`, made non-empty, truncated to `max_len` characters and
/// distinct from every entry in `existing`.
///
/// Collisions are resolved with a trailing `" (N)"` counter. A name that
/// already ends in `" (N)"` continues from `N + 1`, anything else starts at
/// `" (2)"`, and the base is truncated so base and counter fit `max_len`.
/// Every candidate is distinct, so the scan ends after at most
/// `existing.len()` collisions.
///
/// When `max_len` cannot hold `" (N)"` the counter is used alone, and only a
/// counter with more digits than `max_len` exceeds the budget.
pub fn unique_name<S: AsRef<str>>(proposed: &str, existing: &[S], max_len: usize) -> String {
    let proposed = if proposed.is_empty() {
        PLACEHOLDER_NAME
    } else {
        proposed
    };

    let is_taken = |name: &str| existing.iter().any(|taken| taken.as_ref() == name);

    let name = truncate_chars(proposed, max_len);
    if !is_taken(&name) {
        return name;
    }

    let (base, mut counter) = match counter_suffix(&name) {
        Some((base, number)) => (base.to_string(), number + 1),
        None => (name.clone(), 2),
    };

    loop {
        let candidate = with_counter(&base, counter, max_len);
        if !is_taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

fn truncate_chars(name: &str, max_len: usize) -> String {
    name.chars().take(max_len).collect()
}

fn with_counter(base: &str, counter: u64, max_len: usize) -> String {
    let suffix = format!(" ({counter})");
    let suffix_len = suffix.chars().count();

    if suffix_len > max_len {
        return counter.to_string();
    }
    truncate_chars(base, max_len - suffix_len) + &suffix
}

/// Splits `"Name (N)"` into `("Name", N)` for any decimal counter `N >= 1`.
fn counter_suffix(name: &str) -> Option<(&str, u64)> {
    let inner = name.strip_suffix(')')?;
    let open = inner.rfind(" (")?;
    let digits = &inner[open + 2..];

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let number: u64 = digits.parse().ok()?;
    (1..u64::MAX).contains(&number).then_some((&name[..open], number))
}
