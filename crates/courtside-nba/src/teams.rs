// NBA team reference table.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Conference {
    East,
    West,
}

impl Conference {
    pub fn label(self) -> &'static str {
        match self {
            Conference::East => "East",
            Conference::West => "West",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Team {
    pub abbr: &'static str,
    pub name: &'static str,
    /// Traditional Chinese nickname.
    pub local_name: &'static str,
    pub conference: Conference,
}

const fn team(
    abbr: &'static str,
    name: &'static str,
    local_name: &'static str,
    conference: Conference,
) -> Team {
    Team {
        abbr,
        name,
        local_name,
        conference,
    }
}

use Conference::{East, West};

pub static TEAMS: [Team; 30] = [
    team("ATL", "Atlanta Hawks", "老鷹", East),
    team("BOS", "Boston Celtics", "塞爾提克", East),
    team("BKN", "Brooklyn Nets", "籃網", East),
    team("CHA", "Charlotte Hornets", "黃蜂", East),
    team("CHI", "Chicago Bulls", "公牛", East),
    team("CLE", "Cleveland Cavaliers", "騎士", East),
    team("DET", "Detroit Pistons", "活塞", East),
    team("IND", "Indiana Pacers", "溜馬", East),
    team("MIA", "Miami Heat", "熱火", East),
    team("MIL", "Milwaukee Bucks", "公鹿", East),
    team("NYK", "New York Knicks", "尼克", East),
    team("ORL", "Orlando Magic", "魔術", East),
    team("PHI", "Philadelphia 76ers", "七六人", East),
    team("TOR", "Toronto Raptors", "暴龍", East),
    team("WAS", "Washington Wizards", "巫師", East),
    team("DAL", "Dallas Mavericks", "獨行俠", West),
    team("DEN", "Denver Nuggets", "金塊", West),
    team("GSW", "Golden State Warriors", "勇士", West),
    team("HOU", "Houston Rockets", "火箭", West),
    team("LAC", "LA Clippers", "快艇", West),
    team("LAL", "Los Angeles Lakers", "湖人", West),
    team("MEM", "Memphis Grizzlies", "灰熊", West),
    team("MIN", "Minnesota Timberwolves", "灰狼", West),
    team("NOP", "New Orleans Pelicans", "鵜鶘", West),
    team("OKC", "Oklahoma City Thunder", "雷霆", West),
    team("PHX", "Phoenix Suns", "太陽", West),
    team("POR", "Portland Trail Blazers", "拓荒者", West),
    team("SAC", "Sacramento Kings", "國王", West),
    team("SAS", "San Antonio Spurs", "馬刺", West),
    team("UTA", "Utah Jazz", "爵士", West),
];

fn conference(conf: Conference) -> Vec<&'static Team> {
    let mut teams: Vec<&'static Team> = TEAMS.iter().filter(|t| t.conference == conf).collect();
    teams.sort_by_key(|t| t.abbr);
    teams
}

/// Eastern conference, sorted by abbreviation.
pub fn east() -> Vec<&'static Team> {
    conference(East)
}

/// Western conference, sorted by abbreviation.
pub fn west() -> Vec<&'static Team> {
    conference(West)
}

/// Look up a team by abbreviation, ignoring case and surrounding spaces.
pub fn find(abbr: &str) -> Option<&'static Team> {
    let abbr = abbr.trim();
    TEAMS.iter().find(|t| t.abbr.eq_ignore_ascii_case(abbr))
}

/// All abbreviations in table order.
pub fn abbreviations() -> impl Iterator<Item = &'static str> {
    TEAMS.iter().map(|t| t.abbr)
}
