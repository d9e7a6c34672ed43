//! Product keyword table used to highlight a shelf slot when Salva mentions
//! a product in a free-form reply.

use serde::{Deserialize, Serialize};

/// Id of a product on the shop shelves (1..=20).
pub type ProductId = u32;

/// Current shelf highlight. At most one product is highlighted at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HighlightState {
    pub product_id: Option<ProductId>,
}

/// Product aliases in priority order.
///
/// Matching is an exact, case-sensitive substring test and the first entry
/// that matches wins, so an alias that contains another alias must be listed
/// before it.
const DEFAULT_KEYWORDS: &[(&str, ProductId)] = &[
    ("インフィニティ", 1),
    ("スカイプロジェクト", 1),
    ("Newbie", 2),
    ("ンディミ", 3),
    ("チェルベサ", 4),
    ("ブク・アベル", 5),
    ("ブクアベル", 5),
    ("プリマヴェーラ", 6),
    ("パパヨ", 6),
    ("エル セドラル", 7),
    ("エルセドラル", 7),
    ("ニャマシェケ", 8),
    ("オレンジソルベ", 8),
    ("ギテシ", 9),
    ("カロンギ", 9),
    ("マドリッド", 10),
    ("キアンゴイ", 11),
    ("ブク サイサ", 12),
    ("バブルガム", 12),
    ("ドン・ハイメ", 13),
    ("パカマラ", 13),
    ("紬凪", 14),
    ("つむぎ", 14),
    ("うつろい", 15),
    ("魔法ブレンド", 16),
    ("風穴", 17),
    ("マンデリン", 18),
    // Several decaf products exist; 18 is the one on the shelf.
    ("ディカフェ", 18),
    ("ブラジル", 20),
];

/// Ordered keyword → product id list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTable {
    entries: Vec<(String, ProductId)>,
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::new(
            DEFAULT_KEYWORDS
                .iter()
                .map(|(keyword, id)| (keyword.to_string(), *id)),
        )
    }
}

impl KeywordTable {
    pub fn new(entries: impl IntoIterator<Item = (String, ProductId)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Returns the product of the first keyword found in `text`.
    pub fn detect(&self, text: &str) -> Option<ProductId> {
        self.entries
            .iter()
            .find(|(keyword, _)| text.contains(keyword.as_str()))
            .map(|(_, id)| *id)
    }

    pub fn entries(&self) -> &[(String, ProductId)] {
        &self.entries
    }

    /// Pairs `(earlier, later)` where the earlier keyword is contained in the
    /// later one, so the later keyword can never decide the match.
    pub fn shadowed(&self) -> Vec<(&str, &str)> {
        let mut shadowed = Vec::new();
        for (i, (earlier, earlier_id)) in self.entries.iter().enumerate() {
            for (later, later_id) in &self.entries[i + 1..] {
                if earlier_id != later_id && later.contains(earlier.as_str()) {
                    shadowed.push((earlier.as_str(), later.as_str()));
                }
            }
        }
        shadowed
    }
}
