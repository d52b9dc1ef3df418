// Header synonym table for player CSV imports.
//
// Each logical field lists the normalized header spellings it accepts.
// Normalization is a pure function: lowercase, drop whitespace and BOM,
// and fold the various apostrophe/prime characters into `'`.

/// Logical columns of a player CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerField {
    Rank,
    Name,
    Team,
    Position,
    SecondaryPosition,
    Rating,
    PreviousRating,
    RatingDelta,
    ActualSalary,
    EstimatedSalary,
    Difference,
}

impl PlayerField {
    pub const ALL: [PlayerField; 11] = [
        PlayerField::Rank,
        PlayerField::Name,
        PlayerField::Team,
        PlayerField::Position,
        PlayerField::SecondaryPosition,
        PlayerField::Rating,
        PlayerField::PreviousRating,
        PlayerField::RatingDelta,
        PlayerField::ActualSalary,
        PlayerField::EstimatedSalary,
        PlayerField::Difference,
    ];

    /// Header written on export (canonical order is `ALL`).
    pub fn canonical_label(self) -> &'static str {
        match self {
            PlayerField::Rank => "Rank",
            PlayerField::Name => "PLAYER",
            PlayerField::Team => "TEAM",
            PlayerField::Position => "POS",
            PlayerField::SecondaryPosition => "POS'",
            PlayerField::Rating => "Rating",
            PlayerField::PreviousRating => "PreviousRating",
            PlayerField::RatingDelta => "RatingDelta",
            PlayerField::ActualSalary => "ActualSalary",
            PlayerField::EstimatedSalary => "EstimatedSalary",
            PlayerField::Difference => "Difference",
        }
    }

    /// Accepted header spellings, already normalized.
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            PlayerField::Rank => &["rank", "rk", "排名"],
            PlayerField::Name => &["player", "name", "playername", "姓名", "球員", "名字"],
            PlayerField::Team => &["team", "tm", "隊", "球隊", "隊伍"],
            PlayerField::Position => &["pos", "position", "位置"],
            PlayerField::SecondaryPosition => &[
                "pos'",
                "pos2",
                "posprime",
                "secondaryposition",
                "位置'",
                "位置2",
                "第二位置",
            ],
            PlayerField::Rating => &["rating", "score", "評分"],
            PlayerField::PreviousRating => &[
                "previousrating",
                "prevrating",
                "lastrating",
                "lastseasonrating",
                "上季評分",
            ],
            PlayerField::RatingDelta => &["ratingdelta", "delta", "change", "本季增減"],
            PlayerField::ActualSalary => &[
                "actualsalary",
                "actual_salary",
                "salary",
                "real",
                "realsalary",
                "真實薪水",
                "真實薪資",
                "實際薪資",
            ],
            PlayerField::EstimatedSalary => &[
                "estimatedsalary",
                "estimated_salary",
                "est",
                "estimate",
                "estsalary",
                "評估薪水",
                "預估薪資",
                "估算薪資",
                "估值薪資",
            ],
            PlayerField::Difference => &["difference", "diff", "salarydifference", "差額"],
        }
    }
}

/// Normalize a header cell for matching.
pub fn normalize_header(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{FEFF}')
        .map(|c| match c {
            '\u{2019}' | '\u{2018}' | '\u{2032}' | '\u{2035}' | '`' | '\u{FF07}' => '\'',
            other => other,
        })
        .flat_map(char::to_lowercase)
        .collect()
}

/// Column index of every logical field found in a header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    indices: [Option<usize>; 11],
}

impl HeaderMap {
    /// Resolve each field to the first header cell that matches one of its
    /// synonyms. Fields with no match stay unresolved.
    pub fn resolve<S: AsRef<str>>(header: &[S]) -> Self {
        let normalized: Vec<String> = header.iter().map(|h| normalize_header(h.as_ref())).collect();
        let mut indices = [None; 11];
        for (slot, field) in indices.iter_mut().zip(PlayerField::ALL) {
            let wants = field.synonyms();
            *slot = normalized.iter().position(|h| wants.contains(&h.as_str()));
        }
        HeaderMap { indices }
    }

    pub fn index(&self, field: PlayerField) -> Option<usize> {
        self.indices[field as usize]
    }

    /// Fields the header did not provide.
    pub fn missing(&self) -> Vec<PlayerField> {
        PlayerField::ALL
            .into_iter()
            .filter(|f| self.index(*f).is_none())
            .collect()
    }

    /// Cell of `row` for `field`, if the column exists and the row is long
    /// enough.
    pub fn cell<'r, S: AsRef<str>>(&self, row: &'r [S], field: PlayerField) -> Option<&'r str> {
        self.index(field)
            .and_then(|i| row.get(i))
            .map(|s| s.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_space_and_quotes() {
        assert_eq!(normalize_header(" PLAYER "), "player");
        assert_eq!(normalize_header("Actual Salary"), "actualsalary");
        assert_eq!(normalize_header("POS\u{2019}"), "pos'");
        assert_eq!(normalize_header("\u{FEFF}Rank"), "rank");
        assert_eq!(normalize_header("上季 評分"), "上季評分");
    }

    #[test]
    fn synonyms_are_normalized() {
        for field in PlayerField::ALL {
            for syn in field.synonyms() {
                assert_eq!(&normalize_header(syn), syn, "{field:?} synonym {syn:?}");
            }
            let label = normalize_header(field.canonical_label());
            assert!(
                field.synonyms().contains(&label.as_str()),
                "{field:?} must accept its own export label"
            );
        }
    }

    #[test]
    fn synonyms_do_not_overlap() {
        for a in PlayerField::ALL {
            for b in PlayerField::ALL {
                if a == b {
                    continue;
                }
                for syn in a.synonyms() {
                    assert!(!b.synonyms().contains(syn), "{syn:?} in {a:?} and {b:?}");
                }
            }
        }
    }

    #[test]
    fn resolves_english_header() {
        let header = [
            "Rank", "PLAYER", "TEAM", "POS", "POS'", "Rating", "PrevRating", "Delta", "Real",
            "Est", "Diff",
        ];
        let map = HeaderMap::resolve(&header);
        for (i, field) in PlayerField::ALL.into_iter().enumerate() {
            assert_eq!(map.index(field), Some(i), "{field:?}");
        }
        assert!(map.missing().is_empty());
    }

    #[test]
    fn resolves_localized_header_in_any_order() {
        let header = ["評估薪水", "球員", "真實薪水", "隊伍", "評分"];
        let map = HeaderMap::resolve(&header);
        assert_eq!(map.index(PlayerField::EstimatedSalary), Some(0));
        assert_eq!(map.index(PlayerField::Name), Some(1));
        assert_eq!(map.index(PlayerField::ActualSalary), Some(2));
        assert_eq!(map.index(PlayerField::Team), Some(3));
        assert_eq!(map.index(PlayerField::Rating), Some(4));
        assert_eq!(map.index(PlayerField::Rank), None);
        assert!(map.missing().contains(&PlayerField::PreviousRating));
    }

    #[test]
    fn first_match_wins() {
        let map = HeaderMap::resolve(&["name", "player"]);
        assert_eq!(map.index(PlayerField::Name), Some(0));
    }

    #[test]
    fn cell_handles_short_rows() {
        let map = HeaderMap::resolve(&["rank", "player", "team"]);
        let row = ["1", "A"];
        assert_eq!(map.cell(&row, PlayerField::Name), Some("A"));
        assert_eq!(map.cell(&row, PlayerField::Team), None);
        assert_eq!(map.cell(&row, PlayerField::Rating), None);
    }
}
