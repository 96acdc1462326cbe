use rand::Rng;

/// Number of leading ZIP characters compared for the "nearby" tier
const ZIP_PREFIX_LEN: usize = 3;

/// Range drawn for resources sharing the user's 3-digit ZIP prefix
pub const NEARBY_RANGE: (u32, u32) = (1, 5);

/// Range drawn for everything else
pub const FAR_RANGE: (u32, u32) = (5, 14);

/// Estimate the distance in miles between two ZIP codes
///
/// This is a placeholder proximity signal, not a geodistance:
/// * identical ZIPs are 0 miles apart
/// * ZIPs sharing their first three characters draw uniformly from [1, 5]
/// * anything else draws uniformly from [5, 14]
///
/// The random source is injected so callers can seed it.
pub fn zip_distance<R: Rng>(user_zip: &str, resource_zip: &str, rng: &mut R) -> u32 {
    if user_zip == resource_zip {
        return 0;
    }

    let (low, high) = if shares_prefix(user_zip, resource_zip) {
        NEARBY_RANGE
    } else {
        FAR_RANGE
    };

    rng.gen_range(low..=high)
}

/// Whether two ZIPs agree on their leading three characters
#[inline]
pub fn shares_prefix(a: &str, b: &str) -> bool {
    a.chars()
        .take(ZIP_PREFIX_LEN)
        .eq(b.chars().take(ZIP_PREFIX_LEN))
}
