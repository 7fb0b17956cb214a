use std::{
    borrow::Cow,
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};

use rand::{Rng, seq::SliceRandom};

use crate::{
    foundation::error::{Notice, ReelError, ReelResult},
    rotation::history::OutputRecord,
};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    Image,
    Video,
    Quote,
    HealthBenefit,
    Music,
}

impl AssetCategory {
    pub const ALL: [Self; 5] = [
        Self::Image,
        Self::Video,
        Self::Quote,
        Self::HealthBenefit,
        Self::Music,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Quote => "quote",
            Self::HealthBenefit => "health_benefit",
            Self::Music => "music",
        }
    }
}

impl std::fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssetCategory {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == norm || format!("{}s", c.as_str()) == norm)
            .ok_or_else(|| ReelError::validation(format!("unknown asset category '{s}'")))
    }
}

/// Stable identifier of a pool entry, compared against recorded history.
pub trait AssetId {
    fn asset_id(&self) -> Cow<'_, str>;
}

impl AssetId for str {
    fn asset_id(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl AssetId for String {
    fn asset_id(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl AssetId for Path {
    fn asset_id(&self) -> Cow<'_, str> {
        self.to_string_lossy()
    }
}

impl AssetId for PathBuf {
    fn asset_id(&self) -> Cow<'_, str> {
        self.as_path().asset_id()
    }
}

impl<T: AssetId + ?Sized> AssetId for &T {
    fn asset_id(&self) -> Cow<'_, str> {
        (**self).asset_id()
    }
}

/// Outcome of a rotation pick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Selection<T> {
    pub item: T,
    /// Every candidate had been used; the pick came from the full pool.
    pub exhausted: bool,
    pub pool_size: usize,
}

impl<T> Selection<T> {
    pub fn notice(&self) -> Option<Notice> {
        self.exhausted.then_some(Notice::PoolExhausted {
            pool_size: self.pool_size,
        })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Selection<U> {
        Selection {
            item: f(self.item),
            exhausted: self.exhausted,
            pool_size: self.pool_size,
        }
    }
}

/// Pick uniformly among pool entries whose id is not in `used`.
///
/// When every entry has been used, picks uniformly from the whole pool and flags the
/// selection as exhausted instead of failing.
pub fn select_unused<'a, T, R>(
    pool: &'a [T],
    used: &BTreeSet<String>,
    rng: &mut R,
) -> ReelResult<Selection<&'a T>>
where
    T: AssetId,
    R: Rng + ?Sized,
{
    if pool.is_empty() {
        return Err(ReelError::empty_input("cannot select from an empty pool"));
    }

    let fresh: Vec<&T> = pool
        .iter()
        .filter(|item| !used.contains(&*item.asset_id()))
        .collect();

    let (item, exhausted) = match fresh.choose(rng) {
        Some(item) => (*item, false),
        None => {
            let item = pool
                .choose(rng)
                .ok_or_else(|| ReelError::empty_input("cannot select from an empty pool"))?;
            (item, true)
        }
    };

    let selection = Selection {
        item,
        exhausted,
        pool_size: pool.len(),
    };
    if let Some(n) = selection.notice() {
        n.log();
    }
    Ok(selection)
}

/// Pick `n` entries: unused ones first in random order, then previously used ones,
/// then repeats when the pool is smaller than `n`.
pub fn select_many<'a, T, R>(
    pool: &'a [T],
    used: &BTreeSet<String>,
    n: usize,
    rng: &mut R,
) -> ReelResult<Selection<Vec<&'a T>>>
where
    T: AssetId,
    R: Rng + ?Sized,
{
    if pool.is_empty() {
        return Err(ReelError::empty_input("cannot select from an empty pool"));
    }

    let (mut fresh, mut stale): (Vec<&T>, Vec<&T>) = pool
        .iter()
        .partition(|item| !used.contains(&*item.asset_id()));
    fresh.shuffle(rng);
    stale.shuffle(rng);

    let exhausted = fresh.len() < n;
    let order: Vec<&T> = fresh.into_iter().chain(stale).collect();
    let items: Vec<&T> = order.iter().copied().cycle().take(n).collect();

    let selection = Selection {
        item: items,
        exhausted,
        pool_size: pool.len(),
    };
    if let Some(notice) = selection.notice() {
        notice.log();
    }
    Ok(selection)
}

/// Identifiers already used per category, rebuilt from output history each run.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RotationLedger {
    used: BTreeMap<AssetCategory, BTreeSet<String>>,
}

impl RotationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<'r>(records: impl IntoIterator<Item = &'r OutputRecord>) -> Self {
        let mut ledger = Self::new();
        for record in records {
            for (category, id) in record.used_assets() {
                ledger.record(category, id);
            }
        }
        ledger
    }

    pub fn record(&mut self, category: AssetCategory, id: impl Into<String>) {
        self.used.entry(category).or_default().insert(id.into());
    }

    pub fn used(&self, category: AssetCategory) -> &BTreeSet<String> {
        static EMPTY: BTreeSet<String> = BTreeSet::new();
        self.used.get(&category).unwrap_or(&EMPTY)
    }

    pub fn is_used(&self, category: AssetCategory, id: &str) -> bool {
        self.used(category).contains(id)
    }

    pub fn len(&self) -> usize {
        self.used.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn select<'a, T, R>(
        &self,
        category: AssetCategory,
        pool: &'a [T],
        rng: &mut R,
    ) -> ReelResult<Selection<&'a T>>
    where
        T: AssetId,
        R: Rng + ?Sized,
    {
        tracing::debug!(%category, pool = pool.len(), used = self.used(category).len(), "selecting asset");
        select_unused(pool, self.used(category), rng)
    }

    pub fn select_many<'a, T, R>(
        &self,
        category: AssetCategory,
        pool: &'a [T],
        n: usize,
        rng: &mut R,
    ) -> ReelResult<Selection<Vec<&'a T>>>
    where
        T: AssetId,
        R: Rng + ?Sized,
    {
        select_many(pool, self.used(category), n, rng)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/rotation/ledger.rs"]
mod tests;
