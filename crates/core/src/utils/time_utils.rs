use chrono::{DateTime, SubsecRound, Utc};

/// Current instant at microsecond precision, the resolution timestamps are stored with.
///
/// Values built from this compare equal after a round trip through storage.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
