#![allow(dead_code)]

use async_trait::async_trait;
use bracket_service::adapters::match_history::{
    MatchDetail, MatchHistoryProvider, MatchPlayer, MatchSide, RecentMatch,
};
use bracket_service::common::context::Context;
use bracket_service::common::error::{AppError, ServiceResult};
use bracket_service::entities::accounts::LinkedAccount;
use bracket_service::entities::contests::Contest;
use bracket_service::entities::game_events::{GameEvent, MatchDetectedEvent};
use bracket_service::entities::game_teams::GameTeam;
use bracket_service::entities::games::Game;
use bracket_service::entities::match_results::{GameOutcome, MatchPlayerStat, MatchResult};
use bracket_service::entities::teams::{Team, TeamMember};
use bracket_service::models::games::GameTeamType;
use bracket_service::models::match_detection::AccountHandle;
use bracket_service::repositories::accounts::AccountRepository;
use bracket_service::repositories::contests::ContestRepository;
use bracket_service::repositories::game_events::EventPublisher;
use bracket_service::repositories::game_teams::GameTeamRepository;
use bracket_service::repositories::games::GameRepository;
use bracket_service::repositories::locks::DistributedLock;
use bracket_service::repositories::match_results::MatchResultRepository;
use bracket_service::repositories::teams::TeamRepository;
use bracket_service::usecases::{game_teams, games};
use chrono::{DateTime, TimeDelta, Utc};
use hashbrown::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;

pub const REGION: &str = "eu";

#[derive(Default)]
pub struct MemoryDb {
    next_id: AtomicI64,
    pub games: Mutex<Vec<Game>>,
    pub game_teams: Mutex<Vec<GameTeam>>,
    pub match_results: Mutex<Vec<MatchResult>>,
    pub player_stats: Mutex<Vec<MatchPlayerStat>>,
    pub teams: Mutex<Vec<Team>>,
    pub members: Mutex<Vec<TeamMember>>,
    pub accounts: Mutex<Vec<LinkedAccount>>,
    pub contests: Mutex<Vec<Contest>>,
    /// (contest_id, team_id)
    pub registrations: Mutex<Vec<(i64, i64)>>,
    /// Rejects the next outcome write before anything is stored, like a rolled back
    /// transaction.
    pub fail_next_outcome: AtomicBool,
}

impl MemoryDb {
    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl GameRepository for MemoryDb {
    async fn create(&self, mut game: Game) -> anyhow::Result<Game> {
        game.game_id = self.next_id();
        self.games.lock().unwrap().push(game.clone());
        Ok(game)
    }

    async fn create_many(&self, games: Vec<Game>) -> anyhow::Result<Vec<Game>> {
        let mut created = Vec::with_capacity(games.len());
        for game in games {
            created.push(GameRepository::create(self, game).await?);
        }
        Ok(created)
    }

    async fn fetch_one(&self, game_id: i64) -> anyhow::Result<Option<Game>> {
        let games = self.games.lock().unwrap();
        Ok(games.iter().find(|g| g.game_id == game_id).cloned())
    }

    async fn fetch_by_contest(&self, contest_id: i64) -> anyhow::Result<Vec<Game>> {
        let mut games: Vec<Game> = self
            .games
            .lock()
            .unwrap()
            .iter()
            .filter(|g| g.contest_id == contest_id)
            .cloned()
            .collect();
        games.sort_by_key(|g| (g.bracket_position, g.game_id));
        Ok(games)
    }

    async fn fetch_by_contest_and_round(
        &self,
        contest_id: i64,
        round: i32,
    ) -> anyhow::Result<Vec<Game>> {
        let mut games: Vec<Game> = self
            .games
            .lock()
            .unwrap()
            .iter()
            .filter(|g| g.contest_id == contest_id && g.round == Some(round))
            .cloned()
            .collect();
        games.sort_by_key(|g| g.match_number);
        Ok(games)
    }

    async fn fetch_ready_to_activate(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<Game>> {
        let games = self.games.lock().unwrap();
        Ok(games
            .iter()
            .filter(|g| g.status == "PENDING" && g.scheduled_start_time.is_some_and(|s| s <= now))
            .cloned()
            .collect())
    }

    async fn fetch_by_detection_status(
        &self,
        detection_status: &str,
    ) -> anyhow::Result<Vec<Game>> {
        let games = self.games.lock().unwrap();
        Ok(games
            .iter()
            .filter(|g| g.detection_status == detection_status)
            .cloned()
            .collect())
    }

    async fn count_by_contest(&self, contest_id: i64) -> anyhow::Result<i64> {
        let games = self.games.lock().unwrap();
        Ok(games.iter().filter(|g| g.contest_id == contest_id).count() as i64)
    }

    async fn update(&self, game: &Game) -> anyhow::Result<()> {
        let mut games = self.games.lock().unwrap();
        match games.iter_mut().find(|g| g.game_id == game.game_id) {
            Some(stored) => {
                *stored = game.clone();
                Ok(())
            }
            None => anyhow::bail!("game {} does not exist", game.game_id),
        }
    }

    async fn update_many(&self, games: &[Game]) -> anyhow::Result<()> {
        for game in games {
            GameRepository::update(self, game).await?;
        }
        Ok(())
    }

    async fn delete(&self, game_id: i64) -> anyhow::Result<bool> {
        let mut games = self.games.lock().unwrap();
        let before = games.len();
        games.retain(|g| g.game_id != game_id);
        Ok(games.len() != before)
    }
}

#[async_trait]
impl GameTeamRepository for MemoryDb {
    async fn create(&self, mut game_team: GameTeam) -> anyhow::Result<GameTeam> {
        game_team.game_team_id = self.next_id();
        self.game_teams.lock().unwrap().push(game_team.clone());
        Ok(game_team)
    }

    async fn create_many(&self, game_teams: Vec<GameTeam>) -> anyhow::Result<Vec<GameTeam>> {
        let mut created = Vec::with_capacity(game_teams.len());
        for game_team in game_teams {
            created.push(GameTeamRepository::create(self, game_team).await?);
        }
        Ok(created)
    }

    async fn fetch_one(&self, game_team_id: i64) -> anyhow::Result<Option<GameTeam>> {
        let game_teams = self.game_teams.lock().unwrap();
        Ok(game_teams
            .iter()
            .find(|gt| gt.game_team_id == game_team_id)
            .cloned())
    }

    async fn fetch_by_game(&self, game_id: i64) -> anyhow::Result<Vec<GameTeam>> {
        let game_teams = self.game_teams.lock().unwrap();
        Ok(game_teams
            .iter()
            .filter(|gt| gt.game_id == game_id)
            .cloned()
            .collect())
    }

    async fn update_grades(&self, updated: &[GameTeam]) -> anyhow::Result<()> {
        let mut game_teams = self.game_teams.lock().unwrap();
        for game_team in updated {
            if let Some(stored) = game_teams
                .iter_mut()
                .find(|gt| gt.game_team_id == game_team.game_team_id)
            {
                stored.grade = game_team.grade;
            }
        }
        Ok(())
    }

    async fn delete_by_game(&self, game_id: i64) -> anyhow::Result<u64> {
        let mut game_teams = self.game_teams.lock().unwrap();
        let before = game_teams.len();
        game_teams.retain(|gt| gt.game_id != game_id);
        Ok((before - game_teams.len()) as u64)
    }
}

#[async_trait]
impl MatchResultRepository for MemoryDb {
    async fn record_outcome(&self, outcome: GameOutcome) -> anyhow::Result<MatchResult> {
        if self.fail_next_outcome.swap(false, Ordering::SeqCst) {
            anyhow::bail!("outcome write for game {} rolled back", outcome.game.game_id);
        }
        let GameOutcome {
            mut result,
            stats,
            graded,
            game,
            advanced,
        } = outcome;

        result.match_result_id = self.next_id();
        {
            let mut stored_stats = self.player_stats.lock().unwrap();
            for mut stat in stats {
                stat.match_player_stat_id = self.next_id();
                stat.match_result_id = result.match_result_id;
                stored_stats.push(stat);
            }
        }
        self.match_results.lock().unwrap().push(result.clone());
        GameTeamRepository::update_grades(self, &graded).await?;
        GameRepository::update(self, &game).await?;
        if let Some(seat) = advanced {
            GameTeamRepository::create(self, seat).await?;
        }
        Ok(result)
    }

    async fn fetch_by_game(&self, game_id: i64) -> anyhow::Result<Option<MatchResult>> {
        let results = self.match_results.lock().unwrap();
        Ok(results.iter().find(|r| r.game_id == game_id).cloned())
    }

    async fn fetch_player_stats(
        &self,
        match_result_id: i64,
    ) -> anyhow::Result<Vec<MatchPlayerStat>> {
        let stats = self.player_stats.lock().unwrap();
        Ok(stats
            .iter()
            .filter(|s| s.match_result_id == match_result_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TeamRepository for MemoryDb {
    async fn fetch_one(&self, team_id: i64) -> anyhow::Result<Option<Team>> {
        let teams = self.teams.lock().unwrap();
        Ok(teams.iter().find(|t| t.team_id == team_id).cloned())
    }

    async fn fetch_members(&self, team_id: i64) -> anyhow::Result<Vec<TeamMember>> {
        let members = self.members.lock().unwrap();
        Ok(members
            .iter()
            .filter(|m| m.team_id == team_id)
            .cloned()
            .collect())
    }

    async fn fetch_leader(&self, team_id: i64) -> anyhow::Result<Option<TeamMember>> {
        let members = self.members.lock().unwrap();
        Ok(members
            .iter()
            .find(|m| m.team_id == team_id && m.is_leader)
            .cloned())
    }
}

#[async_trait]
impl AccountRepository for MemoryDb {
    async fn fetch_linked(&self, user_id: i64) -> anyhow::Result<Option<LinkedAccount>> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.iter().find(|a| a.user_id == user_id).cloned())
    }
}

#[async_trait]
impl ContestRepository for MemoryDb {
    async fn fetch_one(&self, contest_id: i64) -> anyhow::Result<Option<Contest>> {
        let contests = self.contests.lock().unwrap();
        Ok(contests.iter().find(|c| c.contest_id == contest_id).cloned())
    }

    async fn fetch_registered_team_ids(&self, contest_id: i64) -> anyhow::Result<Vec<i64>> {
        let registrations = self.registrations.lock().unwrap();
        Ok(registrations
            .iter()
            .filter(|(c, _)| *c == contest_id)
            .map(|(_, team_id)| *team_id)
            .collect())
    }
}

/// Serves canned matches keyed by lowercased `name#tag`.
#[derive(Default)]
pub struct ScriptedProvider {
    pub recent: Mutex<HashMap<String, Vec<RecentMatch>>>,
    pub details: Mutex<HashMap<String, MatchDetail>>,
    pub unavailable: AtomicBool,
    pub recent_calls: AtomicI64,
}

#[async_trait]
impl MatchHistoryProvider for ScriptedProvider {
    async fn fetch_recent_matches(
        &self,
        region: &str,
        name: &str,
        tag: &str,
    ) -> ServiceResult<Vec<RecentMatch>> {
        assert_eq!(region, REGION);
        self.recent_calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::ProviderUnavailable);
        }
        let key = AccountHandle::new(name, tag).key();
        Ok(self
            .recent
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_match_detail(&self, match_id: &str) -> ServiceResult<MatchDetail> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::ProviderUnavailable);
        }
        self.details
            .lock()
            .unwrap()
            .get(match_id)
            .cloned()
            .ok_or(AppError::ProviderMatchNotFound)
    }
}

#[derive(Default)]
pub struct RecordingPublisher {
    pub game_events: Mutex<Vec<GameEvent>>,
    pub match_detected: Mutex<Vec<MatchDetectedEvent>>,
}

impl RecordingPublisher {
    pub fn game_event_types(&self, game_id: i64) -> Vec<&'static str> {
        self.game_events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.game_id == game_id)
            .map(|e| e.event_type)
            .collect()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish_game_event(&self, event: GameEvent) {
        self.game_events.lock().unwrap().push(event);
    }

    fn publish_match_detected(&self, event: MatchDetectedEvent) {
        self.match_detected.lock().unwrap().push(event);
    }
}

#[derive(Default)]
pub struct MemoryLock {
    pub held: Mutex<HashSet<String>>,
}

#[async_trait]
impl DistributedLock for MemoryLock {
    async fn try_acquire(&self, key: &str, _ttl: Duration) -> anyhow::Result<bool> {
        Ok(self.held.lock().unwrap().insert(key.to_owned()))
    }

    async fn release(&self, key: &str) -> anyhow::Result<()> {
        self.held.lock().unwrap().remove(key);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryContext {
    pub db: MemoryDb,
    pub provider: ScriptedProvider,
    pub events: RecordingPublisher,
    pub locks: MemoryLock,
}

impl Context for MemoryContext {
    fn games(&self) -> &dyn GameRepository {
        &self.db
    }

    fn game_teams(&self) -> &dyn GameTeamRepository {
        &self.db
    }

    fn match_results(&self) -> &dyn MatchResultRepository {
        &self.db
    }

    fn teams(&self) -> &dyn TeamRepository {
        &self.db
    }

    fn accounts(&self) -> &dyn AccountRepository {
        &self.db
    }

    fn contests(&self) -> &dyn ContestRepository {
        &self.db
    }

    fn match_history(&self) -> &dyn MatchHistoryProvider {
        &self.provider
    }

    fn events(&self) -> &dyn EventPublisher {
        &self.events
    }

    fn locks(&self) -> &dyn DistributedLock {
        &self.locks
    }

    fn region(&self) -> &str {
        REGION
    }
}

/// Which in-match side the winning team played on.
#[derive(Debug, Clone, Copy)]
pub enum WinnerSide {
    Red,
    Blue,
}

impl MemoryContext {
    pub fn add_contest(&self, contest_id: i64, max_team_count: i32, registration_closed: bool) {
        self.db.contests.lock().unwrap().push(Contest {
            contest_id,
            title: format!("Contest {contest_id}"),
            max_team_count,
            team_type: 2,
            registration_closed,
        });
    }

    /// A team of `size` members, user ids `team_id * 10 + i`, every member linked to
    /// `P{user_id}#T{team_id}`. The first member leads.
    pub fn add_team(&self, team_id: i64, size: usize) {
        self.db.teams.lock().unwrap().push(Team {
            team_id,
            name: format!("Team {team_id}"),
            leader_user_id: team_id * 10,
        });
        for i in 0..size as i64 {
            let user_id = team_id * 10 + i;
            self.db.members.lock().unwrap().push(TeamMember {
                team_id,
                user_id,
                is_leader: i == 0,
            });
            self.db.accounts.lock().unwrap().push(LinkedAccount {
                user_id,
                account_name: format!("P{user_id}"),
                account_tag: format!("T{team_id}"),
            });
        }
    }

    pub fn register(&self, contest_id: i64, team_id: i64) {
        self.db
            .registrations
            .lock()
            .unwrap()
            .push((contest_id, team_id));
    }

    pub fn handles(&self, team_id: i64) -> Vec<AccountHandle> {
        let members: Vec<i64> = self
            .db
            .members
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.team_id == team_id)
            .map(|m| m.user_id)
            .collect();
        self.db
            .accounts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| members.contains(&a.user_id))
            .map(|a| AccountHandle::new(&a.account_name, &a.account_tag))
            .collect()
    }

    /// Makes a finished provider match between two teams visible in the recent history of
    /// every listed player. Winners take 13 rounds, losers 7.
    pub fn script_match(
        &self,
        match_id: &str,
        started_at: DateTime<Utc>,
        winners: &[AccountHandle],
        losers: &[AccountHandle],
        winner_side: WinnerSide,
    ) {
        let (winner_side_id, loser_side_id) = match winner_side {
            WinnerSide::Red => ("red", "blue"),
            WinnerSide::Blue => ("blue", "red"),
        };
        let player = |handle: &AccountHandle, side_id: &str| MatchPlayer {
            name: handle.name.clone(),
            tag: handle.tag.clone(),
            side_id: side_id.to_owned(),
            agent: "Sova".to_owned(),
            kills: 15,
            deaths: 12,
            assists: 6,
            score: 240,
            headshots: 9,
            bodyshots: 30,
            legshots: 3,
        };
        let players: Vec<MatchPlayer> = winners
            .iter()
            .map(|h| player(h, winner_side_id))
            .chain(losers.iter().map(|h| player(h, loser_side_id)))
            .collect();

        let detail = MatchDetail {
            match_id: match_id.to_owned(),
            map_name: "Haven".to_owned(),
            mode: "Custom Game".to_owned(),
            started_at,
            duration_seconds: 35 * 60,
            rounds_played: 20,
            sides: vec![
                MatchSide {
                    side_id: winner_side_id.to_owned(),
                    has_won: true,
                    rounds_won: 13,
                },
                MatchSide {
                    side_id: loser_side_id.to_owned(),
                    has_won: false,
                    rounds_won: 7,
                },
            ],
            players,
        };
        let recent = RecentMatch {
            match_id: match_id.to_owned(),
            map_name: detail.map_name.clone(),
            mode: detail.mode.clone(),
            started_at,
            duration_seconds: detail.duration_seconds,
        };

        let mut history = self.provider.recent.lock().unwrap();
        for handle in winners.iter().chain(losers) {
            history.entry(handle.key()).or_default().push(recent.clone());
        }
        self.provider
            .details
            .lock()
            .unwrap()
            .insert(match_id.to_owned(), detail);
    }

    pub fn game_row(&self, game_id: i64) -> Game {
        self.db
            .games
            .lock()
            .unwrap()
            .iter()
            .find(|g| g.game_id == game_id)
            .cloned()
            .expect("game exists")
    }

    pub fn team_ids_in(&self, game_id: i64) -> Vec<i64> {
        self.db
            .game_teams
            .lock()
            .unwrap()
            .iter()
            .filter(|gt| gt.game_id == game_id)
            .map(|gt| gt.team_id)
            .collect()
    }
}

pub fn minutes(m: i64) -> TimeDelta {
    TimeDelta::minutes(m)
}

pub const CONTEST_ID: i64 = 1;

/// An ad-hoc duo game between two fresh teams, scheduled at `start` and activated at
/// `start`. The schedule is written directly so `start` may lie in the past.
pub async fn detecting_game(
    ctx: &MemoryContext,
    team_a: i64,
    team_b: i64,
    start: DateTime<Utc>,
) -> i64 {
    if ctx.db.contests.lock().unwrap().is_empty() {
        ctx.add_contest(CONTEST_ID, 8, true);
    }
    ctx.add_team(team_a, 2);
    ctx.add_team(team_b, 2);

    let game = games::create(ctx, CONTEST_ID, GameTeamType::Duo).await.unwrap();
    game_teams::join(ctx, game.game_id, team_a).await.unwrap();
    game_teams::join(ctx, game.game_id, team_b).await.unwrap();

    let mut game = games::fetch_one(ctx, game.game_id).await.unwrap();
    game.scheduled_start_time = Some(start);
    game.detection_window_minutes = 120;
    games::update(ctx, &game).await.unwrap();
    games::activate(ctx, game, start).await.unwrap().game_id
}
