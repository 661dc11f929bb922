//! Header normalization and row assembly for line-data exports.
//!
//! Providers spell the same column a dozen ways ("Home Line Open",
//! "homeLineOpen", "spread_open"). Headers are squashed to lowercase
//! alphanumerics and resolved through one mapping table; nothing else in the
//! crate interprets raw header names. Columns carrying decimal odds are
//! flagged in the table and converted to American at the boundary so the
//! rest of the pipeline sees one odds system.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::engine::odds::decimal_to_american;
use crate::types::{GameLines, GameMarkets, GameRecord, SeasonType};

/// Lowercase a header and drop everything that is not a letter or digit.
pub fn squash(header: &str) -> String {
    header
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// A recognized column and how to read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub column: Column,
    /// The source quotes decimal odds; convert to American on ingest.
    pub decimal_odds: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Season,
    Week,
    SeasonType,
    StartDate,
    HomeTeam,
    HomeConference,
    HomeScore,
    AwayTeam,
    AwayConference,
    AwayScore,
    Completed,
    LineProvider,
    Line(LineColumn),
}

/// Every numeric line field a row can populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineColumn {
    Spread,
    OverUnder,
    HomeMoneyline,
    AwayMoneyline,
    HomeSpreadPrice,
    AwaySpreadPrice,
    OverPrice,
    UnderPrice,
    HomeLineOpen,
    HomeLineMin,
    HomeLineMax,
    HomeLineClose,
    AwayLineOpen,
    AwayLineMin,
    AwayLineMax,
    AwayLineClose,
    HomeMoneylineOpen,
    HomeMoneylineMin,
    HomeMoneylineMax,
    HomeMoneylineClose,
    AwayMoneylineOpen,
    AwayMoneylineMin,
    AwayMoneylineMax,
    AwayMoneylineClose,
    TotalOpen,
    TotalMin,
    TotalMax,
    TotalClose,
    HomeSpreadPriceOpen,
    HomeSpreadPriceMin,
    HomeSpreadPriceMax,
    HomeSpreadPriceClose,
    AwaySpreadPriceOpen,
    AwaySpreadPriceMin,
    AwaySpreadPriceMax,
    AwaySpreadPriceClose,
    OverPriceOpen,
    OverPriceMin,
    OverPriceMax,
    OverPriceClose,
    UnderPriceOpen,
    UnderPriceMin,
    UnderPriceMax,
    UnderPriceClose,
}

impl LineColumn {
    /// The field this column writes into.
    pub fn slot(self, lines: &mut GameLines) -> &mut Option<f64> {
        use LineColumn::*;
        match self {
            Spread => &mut lines.spread,
            OverUnder => &mut lines.over_under,
            HomeMoneyline => &mut lines.home_moneyline,
            AwayMoneyline => &mut lines.away_moneyline,
            HomeSpreadPrice => &mut lines.home_spread_price,
            AwaySpreadPrice => &mut lines.away_spread_price,
            OverPrice => &mut lines.over_price,
            UnderPrice => &mut lines.under_price,
            HomeLineOpen => &mut lines.home_line_open,
            HomeLineMin => &mut lines.home_line_min,
            HomeLineMax => &mut lines.home_line_max,
            HomeLineClose => &mut lines.home_line_close,
            AwayLineOpen => &mut lines.away_line_open,
            AwayLineMin => &mut lines.away_line_min,
            AwayLineMax => &mut lines.away_line_max,
            AwayLineClose => &mut lines.away_line_close,
            HomeMoneylineOpen => &mut lines.home_moneyline_open,
            HomeMoneylineMin => &mut lines.home_moneyline_min,
            HomeMoneylineMax => &mut lines.home_moneyline_max,
            HomeMoneylineClose => &mut lines.home_moneyline_close,
            AwayMoneylineOpen => &mut lines.away_moneyline_open,
            AwayMoneylineMin => &mut lines.away_moneyline_min,
            AwayMoneylineMax => &mut lines.away_moneyline_max,
            AwayMoneylineClose => &mut lines.away_moneyline_close,
            TotalOpen => &mut lines.total_open,
            TotalMin => &mut lines.total_min,
            TotalMax => &mut lines.total_max,
            TotalClose => &mut lines.total_close,
            HomeSpreadPriceOpen => &mut lines.home_spread_price_open,
            HomeSpreadPriceMin => &mut lines.home_spread_price_min,
            HomeSpreadPriceMax => &mut lines.home_spread_price_max,
            HomeSpreadPriceClose => &mut lines.home_spread_price_close,
            AwaySpreadPriceOpen => &mut lines.away_spread_price_open,
            AwaySpreadPriceMin => &mut lines.away_spread_price_min,
            AwaySpreadPriceMax => &mut lines.away_spread_price_max,
            AwaySpreadPriceClose => &mut lines.away_spread_price_close,
            OverPriceOpen => &mut lines.over_price_open,
            OverPriceMin => &mut lines.over_price_min,
            OverPriceMax => &mut lines.over_price_max,
            OverPriceClose => &mut lines.over_price_close,
            UnderPriceOpen => &mut lines.under_price_open,
            UnderPriceMin => &mut lines.under_price_min,
            UnderPriceMax => &mut lines.under_price_max,
            UnderPriceClose => &mut lines.under_price_close,
        }
    }
}

fn plain(column: Column) -> ColumnSpec {
    ColumnSpec { column, decimal_odds: false }
}

fn line(column: LineColumn) -> ColumnSpec {
    plain(Column::Line(column))
}

fn decimal(column: LineColumn) -> ColumnSpec {
    ColumnSpec { column: Column::Line(column), decimal_odds: true }
}

/// Map one raw header to its column, or `None` for headers we pass over.
pub fn resolve_header(header: &str) -> Option<ColumnSpec> {
    use Column::*;
    use LineColumn as L;
    let spec = match squash(header).as_str() {
        "id" | "gameid" => plain(Id),
        "season" | "year" => plain(Season),
        "week" => plain(Week),
        "seasontype" | "type" => plain(SeasonType),
        "startdate" | "date" | "gamedate" | "kickoff" => plain(StartDate),
        "hometeam" | "home" => plain(HomeTeam),
        "homeconference" | "homeconf" => plain(HomeConference),
        "homescore" | "homepoints" => plain(HomeScore),
        "awayteam" | "away" => plain(AwayTeam),
        "awayconference" | "awayconf" => plain(AwayConference),
        "awayscore" | "awaypoints" => plain(AwayScore),
        "completed" | "final" => plain(Completed),
        "lineprovider" | "provider" | "book" | "sportsbook" => plain(LineProvider),

        "spread" | "pointspread" | "homeline" | "line" => line(L::Spread),
        "overunder" | "total" | "totalscore" | "ou" => line(L::OverUnder),
        "homemoneyline" | "moneylinehome" | "homeml" => line(L::HomeMoneyline),
        "awaymoneyline" | "moneylineaway" | "awayml" => line(L::AwayMoneyline),
        "homeodds" => decimal(L::HomeMoneyline),
        "awayodds" => decimal(L::AwayMoneyline),
        "homespreadprice" => line(L::HomeSpreadPrice),
        "awayspreadprice" => line(L::AwaySpreadPrice),
        "homelineodds" => decimal(L::HomeSpreadPrice),
        "awaylineodds" => decimal(L::AwaySpreadPrice),
        "overprice" => line(L::OverPrice),
        "underprice" => line(L::UnderPrice),
        "overodds" | "totalscoreoverodds" => decimal(L::OverPrice),
        "underodds" | "totalscoreunderodds" => decimal(L::UnderPrice),

        "homelineopen" | "spreadopen" => line(L::HomeLineOpen),
        "homelinemin" | "spreadmin" => line(L::HomeLineMin),
        "homelinemax" | "spreadmax" => line(L::HomeLineMax),
        "homelineclose" | "spreadclose" => line(L::HomeLineClose),
        "awaylineopen" => line(L::AwayLineOpen),
        "awaylinemin" => line(L::AwayLineMin),
        "awaylinemax" => line(L::AwayLineMax),
        "awaylineclose" => line(L::AwayLineClose),

        "homemoneylineopen" | "homemlopen" => line(L::HomeMoneylineOpen),
        "homemoneylinemin" | "homemlmin" => line(L::HomeMoneylineMin),
        "homemoneylinemax" | "homemlmax" => line(L::HomeMoneylineMax),
        "homemoneylineclose" | "homemlclose" => line(L::HomeMoneylineClose),
        "awaymoneylineopen" | "awaymlopen" => line(L::AwayMoneylineOpen),
        "awaymoneylinemin" | "awaymlmin" => line(L::AwayMoneylineMin),
        "awaymoneylinemax" | "awaymlmax" => line(L::AwayMoneylineMax),
        "awaymoneylineclose" | "awaymlclose" => line(L::AwayMoneylineClose),
        "homeoddsopen" => decimal(L::HomeMoneylineOpen),
        "homeoddsmin" => decimal(L::HomeMoneylineMin),
        "homeoddsmax" => decimal(L::HomeMoneylineMax),
        "homeoddsclose" => decimal(L::HomeMoneylineClose),
        "awayoddsopen" => decimal(L::AwayMoneylineOpen),
        "awayoddsmin" => decimal(L::AwayMoneylineMin),
        "awayoddsmax" => decimal(L::AwayMoneylineMax),
        "awayoddsclose" => decimal(L::AwayMoneylineClose),

        "totalopen" | "overunderopen" | "totalscoreopen" => line(L::TotalOpen),
        "totalmin" | "overundermin" | "totalscoremin" => line(L::TotalMin),
        "totalmax" | "overundermax" | "totalscoremax" => line(L::TotalMax),
        "totalclose" | "overunderclose" | "totalscoreclose" => line(L::TotalClose),

        "homespreadpriceopen" => line(L::HomeSpreadPriceOpen),
        "homespreadpricemin" => line(L::HomeSpreadPriceMin),
        "homespreadpricemax" => line(L::HomeSpreadPriceMax),
        "homespreadpriceclose" => line(L::HomeSpreadPriceClose),
        "awayspreadpriceopen" => line(L::AwaySpreadPriceOpen),
        "awayspreadpricemin" => line(L::AwaySpreadPriceMin),
        "awayspreadpricemax" => line(L::AwaySpreadPriceMax),
        "awayspreadpriceclose" => line(L::AwaySpreadPriceClose),
        "homelineoddsopen" => decimal(L::HomeSpreadPriceOpen),
        "homelineoddsmin" => decimal(L::HomeSpreadPriceMin),
        "homelineoddsmax" => decimal(L::HomeSpreadPriceMax),
        "homelineoddsclose" => decimal(L::HomeSpreadPriceClose),
        "awaylineoddsopen" => decimal(L::AwaySpreadPriceOpen),
        "awaylineoddsmin" => decimal(L::AwaySpreadPriceMin),
        "awaylineoddsmax" => decimal(L::AwaySpreadPriceMax),
        "awaylineoddsclose" => decimal(L::AwaySpreadPriceClose),

        "overpriceopen" => line(L::OverPriceOpen),
        "overpricemin" => line(L::OverPriceMin),
        "overpricemax" => line(L::OverPriceMax),
        "overpriceclose" => line(L::OverPriceClose),
        "underpriceopen" => line(L::UnderPriceOpen),
        "underpricemin" => line(L::UnderPriceMin),
        "underpricemax" => line(L::UnderPriceMax),
        "underpriceclose" => line(L::UnderPriceClose),
        "overoddsopen" => decimal(L::OverPriceOpen),
        "overoddsmin" => decimal(L::OverPriceMin),
        "overoddsmax" => decimal(L::OverPriceMax),
        "overoddsclose" => decimal(L::OverPriceClose),
        "underoddsopen" => decimal(L::UnderPriceOpen),
        "underoddsmin" => decimal(L::UnderPriceMin),
        "underoddsmax" => decimal(L::UnderPriceMax),
        "underoddsclose" => decimal(L::UnderPriceClose),

        _ => return None,
    };
    Some(spec)
}

// ---------------------------------------------------------------------------
// Row assembly
// ---------------------------------------------------------------------------

/// Accumulates one row's cells before validation.
#[derive(Debug, Default)]
pub struct RowDraft {
    id: Option<i64>,
    season: Option<i32>,
    week: Option<i32>,
    season_type: Option<SeasonType>,
    start_date: Option<DateTime<Utc>>,
    home_team: Option<String>,
    home_conference: Option<String>,
    home_score: Option<i32>,
    away_team: Option<String>,
    away_conference: Option<String>,
    away_score: Option<i32>,
    completed: Option<bool>,
    line_provider: Option<String>,
    lines: GameLines,
}

impl RowDraft {
    /// Apply one cell. Required identity fields reject garbage; optional
    /// fields fall back to absent instead.
    pub fn apply(&mut self, spec: &ColumnSpec, raw: &str) -> Result<(), String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(());
        }
        match spec.column {
            Column::Id => {
                self.id = Some(raw.parse().map_err(|_| format!("bad id '{raw}'"))?);
            }
            Column::Season => {
                self.season = Some(raw.parse().map_err(|_| format!("bad season '{raw}'"))?);
            }
            Column::Week => self.week = raw.parse().ok(),
            Column::SeasonType => self.season_type = SeasonType::from_label(raw),
            Column::StartDate => {
                self.start_date =
                    Some(parse_date(raw).ok_or_else(|| format!("bad startDate '{raw}'"))?);
            }
            Column::HomeTeam => self.home_team = Some(raw.to_string()),
            Column::HomeConference => self.home_conference = Some(raw.to_string()),
            Column::HomeScore => self.home_score = raw.parse().ok(),
            Column::AwayTeam => self.away_team = Some(raw.to_string()),
            Column::AwayConference => self.away_conference = Some(raw.to_string()),
            Column::AwayScore => self.away_score = raw.parse().ok(),
            Column::Completed => self.completed = parse_bool(raw),
            Column::LineProvider => self.line_provider = Some(raw.to_string()),
            Column::Line(col) => {
                let value = if spec.decimal_odds {
                    parse_f64(raw).and_then(decimal_to_american)
                } else {
                    parse_f64(raw)
                };
                if value.is_some() {
                    *col.slot(&mut self.lines) = value;
                }
            }
        }
        Ok(())
    }

    /// Validate and produce the record.
    pub fn finish(self) -> Result<GameRecord, String> {
        let home_score = self.home_score;
        let away_score = self.away_score;
        Ok(GameRecord {
            id: self.id.ok_or("missing id")?,
            season: self.season.ok_or("missing season")?,
            week: self.week,
            season_type: self.season_type.unwrap_or_default(),
            start_date: self.start_date.ok_or("missing startDate")?,
            home_team: self.home_team.ok_or("missing homeTeam")?,
            home_conference: self.home_conference,
            home_score,
            away_team: self.away_team.ok_or("missing awayTeam")?,
            away_conference: self.away_conference,
            away_score,
            // Exports without a completed flag mark finals by filled scores.
            completed: self
                .completed
                .unwrap_or_else(|| home_score.is_some() && away_score.is_some()),
            line_provider: self.line_provider,
            markets: GameMarkets {
                lines: self.lines,
                ..Default::default()
            },
        })
    }
}

fn parse_f64(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Some(true),
        "false" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squash_strips_everything_but_alphanumerics() {
        assert_eq!(squash("Home Line Open"), "homelineopen");
        assert_eq!(squash("home_line_open"), "homelineopen");
        assert_eq!(squash("HomeLineOpen"), "homelineopen");
        assert_eq!(squash("\"Over/Under\""), "overunder");
    }

    #[test]
    fn spellings_resolve_to_one_column() {
        for header in ["Home Team", "homeTeam", "HOME_TEAM", "home"] {
            assert_eq!(resolve_header(header), Some(plain(Column::HomeTeam)), "{header}");
        }
        for header in ["spread_close", "Spread Close", "homeLineClose"] {
            assert_eq!(
                resolve_header(header),
                Some(line(LineColumn::HomeLineClose)),
                "{header}"
            );
        }
        assert_eq!(resolve_header("attendance"), None);
    }

    #[test]
    fn odds_headers_carry_the_decimal_flag() {
        let spec = resolve_header("Home Odds Open").unwrap();
        assert_eq!(spec.column, Column::Line(LineColumn::HomeMoneylineOpen));
        assert!(spec.decimal_odds);

        let spec = resolve_header("homeMoneylineOpen").unwrap();
        assert!(!spec.decimal_odds);
    }

    #[test]
    fn decimal_cells_convert_to_american() {
        let mut draft = RowDraft::default();
        draft
            .apply(&decimal(LineColumn::HomeMoneyline), "2.50")
            .unwrap();
        draft
            .apply(&decimal(LineColumn::AwayMoneyline), "1.5")
            .unwrap();
        assert_eq!(draft.lines.home_moneyline, Some(150.0));
        assert_eq!(draft.lines.away_moneyline, Some(-200.0));
    }

    #[test]
    fn unpayable_decimal_odds_stay_absent() {
        let mut draft = RowDraft::default();
        draft.apply(&decimal(LineColumn::OverPrice), "1.0").unwrap();
        assert_eq!(draft.lines.over_price, None);
    }

    #[test]
    fn finish_requires_identity_fields() {
        let mut draft = RowDraft::default();
        draft.apply(&plain(Column::Season), "2024").unwrap();
        assert_eq!(draft.finish().unwrap_err(), "missing id");
    }

    #[test]
    fn a_full_draft_builds_a_record() {
        let mut draft = RowDraft::default();
        for (header, cell) in [
            ("id", "401"),
            ("season", "2024"),
            ("week", "5"),
            ("start_date", "2024-10-05T19:30:00Z"),
            ("home_team", "Texas"),
            ("away_team", "Oklahoma State"),
            ("home_score", "31"),
            ("away_score", "17"),
            ("spread", "-6.5"),
        ] {
            let spec = resolve_header(header).unwrap();
            draft.apply(&spec, cell).unwrap();
        }
        let record = draft.finish().unwrap();
        assert_eq!(record.id, 401);
        assert!(record.completed, "scores imply a final");
        assert_eq!(record.markets.lines.spread, Some(-6.5));
        assert_eq!(record.season_type, SeasonType::Regular);
    }

    #[test]
    fn date_spellings_all_parse() {
        for raw in [
            "2024-09-07T19:00:00Z",
            "2024-09-07 19:00:00",
            "2024-09-07",
            "09/07/2024",
        ] {
            assert!(parse_date(raw).is_some(), "{raw}");
        }
        assert_eq!(parse_date("next saturday"), None);
    }
}
