use std::fmt;

/// Workflow stage a file is routed into.
/// The folder label is the final path segment under the serial directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    Qi,
    PcaIncoming,
    PreConformalCoating,
    PostConformalCoating,
    Assembly,
    FinalOutgoing,
    Misc,
    PreVibration,
    PostVibration,
}

impl Category {
    /// All categories in menu order.
    pub const ALL: [Self; 9] = [
        Self::Qi,
        Self::PcaIncoming,
        Self::PreConformalCoating,
        Self::PostConformalCoating,
        Self::Assembly,
        Self::FinalOutgoing,
        Self::Misc,
        Self::PreVibration,
        Self::PostVibration,
    ];

    /// Fallback when no keyword matches during inference.
    pub const DEFAULT: Self = Self::Misc;

    /// Keyword table for inferring a category from a filename token.
    /// Matching is substring containment against the lowercased token,
    /// and the first entry in this order wins, so the order is load-bearing.
    const KEYWORDS: [(&'static str, Self); 9] = [
        ("qi", Self::Qi),
        ("incoming", Self::PcaIncoming),
        ("preconformal", Self::PreConformalCoating),
        ("postconformal", Self::PostConformalCoating),
        ("assembly", Self::Assembly),
        ("finaloutgoing", Self::FinalOutgoing),
        ("previbration", Self::PreVibration),
        ("postvibration", Self::PostVibration),
        ("misc", Self::Misc),
    ];

    /// Numeric menu key, stable across releases.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Qi => "0",
            Self::PcaIncoming => "1",
            Self::PreConformalCoating => "2",
            Self::PostConformalCoating => "3",
            Self::Assembly => "4",
            Self::FinalOutgoing => "5",
            Self::Misc => "6",
            Self::PreVibration => "7",
            Self::PostVibration => "8",
        }
    }

    /// Destination folder name for this category.
    pub const fn folder_name(self) -> &'static str {
        match self {
            Self::Qi => "0__QI",
            Self::PcaIncoming => "1__PCA Incoming",
            Self::PreConformalCoating => "2__Pre-Conformal Coating",
            Self::PostConformalCoating => "3__Post-Conformal Coating",
            Self::Assembly => "4__Assembly",
            Self::FinalOutgoing => "5__Final Outgoing",
            Self::Misc => "6__Misc",
            Self::PreVibration => "7__Pre-Vibration & Shock Testing",
            Self::PostVibration => "8__Post-Vibration & Shock Testing",
        }
    }

    /// Look up a category by its menu key.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL.into_iter().find(|category| category.key() == key)
    }

    /// Infer the destination category from a filename.
    ///
    /// The filename is split on `_` and `-`, and the second token is the
    /// candidate keyword. A missing second token or an unmatched keyword
    /// falls back to [`Category::DEFAULT`]; inference never fails outward.
    pub fn infer(filename: &str) -> Self {
        let Some(token) = filename.split(['_', '-']).nth(1) else {
            return Self::DEFAULT;
        };
        let candidate = token.to_lowercase();
        Self::KEYWORDS
            .into_iter()
            .find(|(keyword, _)| candidate.contains(keyword))
            .map_or(Self::DEFAULT, |(_, category)| category)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.folder_name())
    }
}

#[cfg(test)]
mod category_tests {
    use super::*;

    #[test]
    fn from_key_finds_all_menu_keys() {
        for category in Category::ALL {
            assert_eq!(Category::from_key(category.key()), Some(category));
        }
    }

    #[test]
    fn from_key_trims_input() {
        assert_eq!(Category::from_key(" 5 "), Some(Category::FinalOutgoing));
    }

    #[test]
    fn from_key_rejects_unknown_keys() {
        assert_eq!(Category::from_key("9"), None);
        assert_eq!(Category::from_key("x"), None);
        assert_eq!(Category::from_key(""), None);
    }

    #[test]
    fn infer_matches_final_outgoing() {
        assert_eq!(
            Category::infer("AB12345678_FinalOutgoing_IMG01.jpg"),
            Category::FinalOutgoing
        );
    }

    #[test]
    fn infer_is_case_insensitive() {
        assert_eq!(Category::infer("AB12345678_ASSEMBLY_01.jpg"), Category::Assembly);
        assert_eq!(Category::infer("AB12345678_assembly_01.jpg"), Category::Assembly);
    }

    #[test]
    fn infer_handles_dash_separators() {
        assert_eq!(
            Category::infer("AB12345678-PreVibration-IMG.jpg"),
            Category::PreVibration
        );
    }

    #[test]
    fn infer_matches_keyword_inside_longer_token() {
        // Extension glued to the token still matches by substring containment
        assert_eq!(Category::infer("AB12345678_Misc.jpg"), Category::Misc);
        assert_eq!(Category::infer("AB12345678_PCAIncoming2.jpg"), Category::PcaIncoming);
    }

    #[test]
    fn infer_unknown_keyword_falls_back_to_misc() {
        assert_eq!(Category::infer("AB12345678_Unknown_part.jpg"), Category::DEFAULT);
    }

    #[test]
    fn infer_without_separator_falls_back_to_misc() {
        assert_eq!(Category::infer("AB12345678.jpg"), Category::DEFAULT);
    }

    #[test]
    fn infer_first_table_entry_wins() {
        // "qi" is a substring of the token, and sits before "incoming" in the table
        assert_eq!(Category::infer("AB12345678_QIIncoming_01.jpg"), Category::Qi);
    }

    #[test]
    fn folder_names_keep_menu_key_prefix() {
        for category in Category::ALL {
            assert!(category.folder_name().starts_with(category.key()));
        }
    }
}
