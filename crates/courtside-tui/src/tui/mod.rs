// Terminal UI: view state, input handling and widget rendering.
//
// The TUI owns a `ViewState` holding the latest document pushed by the
// session, the derived statistics and the per-table sort state. Updates
// arrive over an mpsc channel; the frame is redrawn at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;

use courtside_app::{AppData, UiUpdate, UserCommand};
use courtside_core::ImportMode;
use courtside_nba::columns;
use courtside_nba::predict::{prediction_stats, TeamPrediction};
use courtside_nba::table::TableError;
use courtside_nba::teams::{self, Conference, Team};
use courtside_nba::{compute_stats, Palette, PlayerRecord, SortState, StatsRange, TableSpec};

use layout::build_layout;

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TabId {
    #[default]
    Players,
    Teams,
    Predict,
}

/// Which of the two team tables is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TeamView {
    #[default]
    Ratings,
    Salary,
}

/// The column descriptor lists, built once at startup.
pub struct Tables {
    pub players: TableSpec<PlayerRecord>,
    pub team_ratings: TableSpec<PlayerRecord>,
    pub team_salary: TableSpec<PlayerRecord>,
    pub predict: TableSpec<TeamPrediction>,
}

impl Tables {
    pub fn new() -> Result<Self, TableError> {
        Ok(Tables {
            players: columns::player_table()?,
            team_ratings: columns::team_ratings_table()?,
            team_salary: columns::team_salary_table()?,
            predict: columns::predict_table()?,
        })
    }
}

/// Last message shown in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
}

/// Every team, sorted by abbreviation.
pub fn all_teams() -> Vec<&'static Team> {
    let mut all = teams::east();
    all.extend(teams::west());
    all.sort_by_key(|t| t.abbr);
    all
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

pub struct ViewState {
    pub data: Arc<AppData>,
    /// Player statistics over the full population, never the filtered view.
    pub stats: StatsRange,
    /// Prediction statistics over all 30 teams.
    pub predict_stats: StatsRange,
    pub palette: Palette,
    pub tables: Tables,
    pub active_tab: TabId,
    pub players_sort: SortState,
    pub ratings_sort: SortState,
    pub salary_sort: SortState,
    pub predict_sort: SortState,
    pub team_view: TeamView,
    /// Index into `all_teams()`.
    pub team_index: usize,
    pub conference: Conference,
    /// Column cursor for sorting and prediction edits.
    pub column: usize,
    /// Row cursor into the rendered (sorted) rows.
    pub selected: usize,
    pub filter_text: String,
    pub filter_mode: bool,
    pub command_mode: bool,
    pub command_text: String,
    /// Player id shown in the detail popup.
    pub detail: Option<String>,
    pub notice: Option<Notice>,
    /// Mode used by `:import` when none is given.
    pub import_mode: ImportMode,
}

impl ViewState {
    pub fn new(palette: Palette, import_mode: ImportMode) -> Result<Self, TableError> {
        let tables = Tables::new()?;
        let data = Arc::new(AppData::default());
        Ok(ViewState {
            stats: compute_stats(&data.players),
            predict_stats: prediction_stats(&data.predictions(&all_teams())),
            data,
            palette,
            players_sort: tables.players.default_sort(),
            ratings_sort: tables.team_ratings.default_sort(),
            salary_sort: tables.team_salary.default_sort(),
            predict_sort: tables.predict.default_sort(),
            tables,
            active_tab: TabId::default(),
            team_view: TeamView::default(),
            team_index: 0,
            conference: Conference::East,
            column: 0,
            selected: 0,
            filter_text: String::new(),
            filter_mode: false,
            command_mode: false,
            command_text: String::new(),
            detail: None,
            notice: None,
            import_mode,
        })
    }

    /// Replace the document and recompute everything derived from it.
    pub fn apply_data(&mut self, data: Arc<AppData>) {
        self.stats = compute_stats(&data.players);
        self.predict_stats = prediction_stats(&data.predictions(&all_teams()));
        if let Some(id) = &self.detail {
            if data.player(id).is_none() {
                self.detail = None;
            }
        }
        self.data = data;
        self.clamp_cursors();
    }

    pub fn current_team(&self) -> &'static Team {
        let all = all_teams();
        all[self.team_index % all.len()]
    }

    pub fn conference_teams(&self) -> Vec<&'static Team> {
        match self.conference {
            Conference::East => teams::east(),
            Conference::West => teams::west(),
        }
    }

    /// Players matching the filter text by name or team.
    pub fn filtered_players(&self) -> Vec<&PlayerRecord> {
        let needle = self.filter_text.trim().to_lowercase();
        self.data
            .players
            .iter()
            .filter(|p| {
                needle.is_empty()
                    || p.name.to_lowercase().contains(&needle)
                    || p.team.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn team_table(&self) -> (&TableSpec<PlayerRecord>, &SortState) {
        match self.team_view {
            TeamView::Ratings => (&self.tables.team_ratings, &self.ratings_sort),
            TeamView::Salary => (&self.tables.team_salary, &self.salary_sort),
        }
    }

    pub fn predictions(&self) -> Vec<TeamPrediction> {
        self.data.predictions(&self.conference_teams())
    }

    pub fn row_count(&self) -> usize {
        match self.active_tab {
            TabId::Players => self.filtered_players().len(),
            TabId::Teams => self.data.team_players(self.current_team().abbr).count(),
            TabId::Predict => self.conference_teams().len(),
        }
    }

    pub fn column_count(&self) -> usize {
        match self.active_tab {
            TabId::Players => self.tables.players.columns().len(),
            TabId::Teams => self.team_table().0.columns().len(),
            TabId::Predict => self.tables.predict.columns().len(),
        }
    }

    /// Key of the column under the cursor.
    pub fn column_key(&self) -> Option<&'static str> {
        match self.active_tab {
            TabId::Players => self.tables.players.columns().get(self.column).map(|c| c.key),
            TabId::Teams => self.team_table().0.columns().get(self.column).map(|c| c.key),
            TabId::Predict => self.tables.predict.columns().get(self.column).map(|c| c.key),
        }
    }

    pub fn clamp_cursors(&mut self) {
        let rows = self.row_count();
        if self.selected >= rows {
            self.selected = rows.saturating_sub(1);
        }
        let cols = self.column_count();
        if self.column >= cols {
            self.column = cols.saturating_sub(1);
        }
    }

    /// Sort by the column under the cursor (toggle if already active).
    pub fn activate_sort(&mut self) -> bool {
        let column = self.column;
        let (spec_columns, sort) = match self.active_tab {
            TabId::Players => (self.tables.players.columns(), &mut self.players_sort),
            TabId::Teams => match self.team_view {
                TeamView::Ratings => (self.tables.team_ratings.columns(), &mut self.ratings_sort),
                TeamView::Salary => (self.tables.team_salary.columns(), &mut self.salary_sort),
            },
            TabId::Predict => {
                let Some(col) = self.tables.predict.columns().get(column) else {
                    return false;
                };
                return self.predict_sort.activate(col);
            }
        };
        match spec_columns.get(column) {
            Some(col) => sort.activate(col),
            None => false,
        }
    }

    /// Id of the player under the row cursor, in displayed order.
    pub fn selected_player_id(&self) -> Option<String> {
        match self.active_tab {
            TabId::Players => {
                let rows = self.filtered_players();
                let table = self.tables.players.render(
                    rows.iter().copied(),
                    &self.players_sort,
                    &self.stats,
                    &self.palette,
                );
                table.select(self.selected, |p| p.id.clone())
            }
            TabId::Teams => {
                let (spec, sort) = self.team_table();
                let table = spec.render(
                    self.data.team_players(self.current_team().abbr),
                    sort,
                    &self.stats,
                    &self.palette,
                );
                table.select(self.selected, |p| p.id.clone())
            }
            TabId::Predict => None,
        }
    }

    /// Team under the row cursor on the Predict tab.
    pub fn selected_prediction_team(&self) -> Option<&'static Team> {
        if self.active_tab != TabId::Predict {
            return None;
        }
        let rows = self.predictions();
        let table = self.tables.predict.render(
            &rows,
            &self.predict_sort,
            &self.predict_stats,
            &self.palette,
        );
        table.select(self.selected, |p| p.team)
    }

    pub fn switch_tab(&mut self, tab: TabId) {
        if self.active_tab != tab {
            self.active_tab = tab;
            self.column = 0;
            self.selected = 0;
        }
    }

    pub fn set_notice(&mut self, text: impl Into<String>, is_error: bool) {
        self.notice = Some(Notice {
            text: text.into(),
            is_error,
        });
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::State(data) => state.apply_data(data),
        UiUpdate::Notice(text) => state.set_notice(text, false),
        UiUpdate::Error(text) => state.set_notice(text, true),
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    match state.active_tab {
        TabId::Players => widgets::players::render(frame, layout.main_panel, state),
        TabId::Teams => widgets::team_view::render(frame, layout.main_panel, state),
        TabId::Predict => widgets::predict::render(frame, layout.main_panel, state),
    }
    widgets::help_bar::render(frame, layout.help_bar, state);

    if let Some(player) = state.detail.as_deref().and_then(|id| state.data.player(id)) {
        widgets::detail::render(frame, layout::centered(frame.area(), 60, 60), player, state);
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop until the user quits or the session goes away.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    mut view_state: ViewState,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    // Restore the terminal before the default hook prints.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result = loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    None => break Ok(()),
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break Ok(());
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(anyhow::Error::new(e).context("terminal input failed")),
                    None => break Ok(()),
                }
            }

            _ = render_tick.tick() => {
                if let Err(e) = terminal.draw(|frame| render_frame(frame, &view_state)) {
                    break Err(anyhow::Error::new(e).context("failed to draw frame"));
                }
            }
        }
    };

    ratatui::restore();
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
