use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Highest field id handed out (or observed) in this process.
static LAST_FIELD_ID: AtomicU64 = AtomicU64::new(0);

/// Identifier of a field within a field sequence.
///
/// Fresh ids are seeded from the millisecond wall clock, like the timestamps
/// older documents carry, but are strictly monotonic within the process: two
/// calls in the same millisecond still yield distinct ids.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldId(u64);

impl FieldId {
    /// Largest id accepted from a document: the largest integer a JSON peer
    /// holds exactly. Keeps the counter far from `u64::MAX`.
    pub const MAX: u64 = (1 << 53) - 1;

    pub const fn new(raw: u64) -> Self {
        FieldId(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Allocate a new id that has never been returned by this process.
    pub fn fresh() -> Self {
        Self::fresh_at(now_ms())
    }

    /// Allocate a new id using `now_ms` as the clock reading.
    /// The result is `max(now_ms, last + 1)`.
    pub fn fresh_at(now_ms: u64) -> Self {
        let mut last = LAST_FIELD_ID.load(Ordering::Relaxed);
        loop {
            let next = next_after(last, now_ms);
            match LAST_FIELD_ID.compare_exchange_weak(
                last,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return FieldId(next),
                Err(actual) => last = actual,
            }
        }
    }

    /// Record an id that came from outside (a loaded document) so that
    /// `fresh` never hands it out again.
    ///
    /// Ids above [`FieldId::MAX`] never come out of a document; observing one
    /// only advances the counter to `MAX`.
    pub fn observe(id: FieldId) {
        LAST_FIELD_ID.fetch_max(id.0.min(Self::MAX), Ordering::Relaxed);
    }
}

fn next_after(last: u64, now_ms: u64) -> u64 {
    now_ms.max(last.saturating_add(1))
}

#[cfg(not(target_arch = "wasm32"))]
fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// No wall clock on wasm32-unknown-unknown; the bridge seeds the counter via
// `FieldId::observe` with the host's `Date.now()`.
#[cfg(target_arch = "wasm32")]
fn now_ms() -> u64 {
    0
}

impl fmt::Debug for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for FieldId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for FieldId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = deserializer.deserialize_any(NumericIdVisitor)?;
        if raw > FieldId::MAX {
            return Err(de::Error::custom(format!("field id {raw} out of range")));
        }
        Ok(FieldId(raw))
    }
}

/// Server-assigned identity of a persisted form.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FormId(u64);

impl FormId {
    pub const fn new(raw: u64) -> Self {
        FormId(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "form#{}", self.0)
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for FormId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(FormId)
    }
}

impl Serialize for FormId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for FormId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NumericIdVisitor).map(FormId)
    }
}

/// Accepts a non-negative integer, an integral float (JS timestamps), or a
/// numeric string.
struct NumericIdVisitor;

impl Visitor<'_> for NumericIdVisitor {
    type Value = u64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer id")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
        u64::try_from(v).map_err(|_| E::custom(format!("negative id {v}")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<u64, E> {
        if v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 {
            Ok(v as u64)
        } else {
            Err(E::custom(format!("non-integral id {v}")))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
        v.trim()
            .parse()
            .map_err(|_| E::custom(format!("invalid id {v:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_unique() {
        let a = FieldId::fresh();
        let b = FieldId::fresh();
        let c = FieldId::fresh();
        assert!(a < b && b < c);
    }

    #[test]
    fn fresh_at_same_millisecond_still_advances() {
        let a = FieldId::fresh_at(5);
        let b = FieldId::fresh_at(5);
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn observed_ids_are_not_reissued() {
        let far = FieldId::new(FieldId::fresh().get() + 1_000_000);
        FieldId::observe(far);
        assert!(FieldId::fresh() > far);
    }

    #[test]
    fn out_of_range_field_ids_are_rejected() {
        assert!(serde_json::from_str::<FieldId>("18446744073709551615").is_err());
        assert!(serde_json::from_str::<FieldId>("\"9007199254740992\"").is_err());
        let max: FieldId = serde_json::from_str("9007199254740991").unwrap();
        assert_eq!(max.get(), FieldId::MAX);

        let text = r#"[{"id":18446744073709551615,"type":"text"}]"#;
        assert!(crate::wire::decode_fields(text).is_err());
    }

    #[test]
    fn counter_saturates_instead_of_overflowing() {
        assert_eq!(next_after(u64::MAX, 0), u64::MAX);
        assert_eq!(next_after(4, 2), 5);
        assert_eq!(next_after(4, 9), 9);
    }

    #[test]
    fn ids_accept_numbers_and_numeric_strings() {
        let a: FieldId = serde_json::from_str("1700000000000").unwrap();
        let b: FieldId = serde_json::from_str("\"42\"").unwrap();
        let c: FormId = serde_json::from_str("7.0").unwrap();
        assert_eq!(a.get(), 1_700_000_000_000);
        assert_eq!(b.get(), 42);
        assert_eq!(c.get(), 7);
        assert!(serde_json::from_str::<FieldId>("-1").is_err());
    }
}
