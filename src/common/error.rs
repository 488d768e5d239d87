use crate::models::games::{DetectionStatus, GameStatus};
use std::fmt::{Display, Formatter};
use tracing::error;

pub type ServiceResult<T> = Result<T, AppError>;

#[track_caller]
pub fn unexpected<T, E: Into<anyhow::Error>>(e: E) -> ServiceResult<T> {
    let caller = std::panic::Location::caller();
    error!("An unexpected error has occurred at {caller}: {}", e.into());
    Err(AppError::Unexpected)
}

/// Error categories callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    StateConflict,
    NotFound,
    ExternalDependency,
    BusinessRule,
    Unexpected,
}

#[derive(Debug)]
pub enum AppError {
    Unexpected,

    BracketsInvalidTeamCount,
    BracketsAlreadyGenerated,
    BracketsNotGenerated,
    BracketsAlreadyAllocated,
    BracketsNotEnoughTeams,
    BracketsRegistrationOpen,

    ContestsNotFound,

    DetectionNotDetecting,
    DetectionManualResultNotAllowed,
    DetectionSideUnresolved,
    DetectionNoWinner,
    DetectionResultAlreadyRecorded,

    GamesNotFound,
    GamesInvalidStatusTransition(GameStatus, GameStatus),
    GamesInvalidDetectionTransition(DetectionStatus, DetectionStatus),
    GamesInvalidTeamType,
    GamesInvalidBracketCoordinates,
    GamesNotPending,
    GamesNotScheduled,
    GamesScheduleInPast,
    GamesInvalidDuration,
    GamesTeamCountMismatch,
    GamesBracketGame,
    GamesCancelForbidden,

    GameTeamsNotFound,
    GameTeamsInvalidGrade,
    GameTeamsDuplicateGrade,
    GameTeamsGameFull,
    GameTeamsContestFull,
    GameTeamsAlreadyJoined,
    GameTeamsTeamSizeMismatch,
    GameTeamsWinnerNotInGame,

    MatchResultsNotFound,
    MatchResultsInvalidScore,

    ProviderPlayerNotFound,
    ProviderMatchNotFound,
    ProviderRateLimited,
    ProviderUnavailable,

    TeamsNotFound,
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    #[track_caller]
    fn from(e: E) -> Self {
        unexpected::<(), E>(e).unwrap_err()
    }
}

impl AppError {
    pub const fn as_str(&self) -> &str {
        self.code()
    }

    pub const fn code(&self) -> &'static str {
        match self {
            AppError::Unexpected => "unexpected",

            AppError::BracketsInvalidTeamCount => "brackets.invalid_team_count",
            AppError::BracketsAlreadyGenerated => "brackets.already_generated",
            AppError::BracketsNotGenerated => "brackets.not_generated",
            AppError::BracketsAlreadyAllocated => "brackets.already_allocated",
            AppError::BracketsNotEnoughTeams => "brackets.not_enough_teams",
            AppError::BracketsRegistrationOpen => "brackets.registration_open",

            AppError::ContestsNotFound => "contests.not_found",

            AppError::DetectionNotDetecting => "detection.not_detecting",
            AppError::DetectionManualResultNotAllowed => "detection.manual_result_not_allowed",
            AppError::DetectionSideUnresolved => "detection.side_unresolved",
            AppError::DetectionNoWinner => "detection.no_winner",
            AppError::DetectionResultAlreadyRecorded => "detection.result_already_recorded",

            AppError::GamesNotFound => "games.not_found",
            AppError::GamesInvalidStatusTransition(_, _) => "games.invalid_status_transition",
            AppError::GamesInvalidDetectionTransition(_, _) => {
                "games.invalid_detection_transition"
            }
            AppError::GamesInvalidTeamType => "games.invalid_team_type",
            AppError::GamesInvalidBracketCoordinates => "games.invalid_bracket_coordinates",
            AppError::GamesNotPending => "games.not_pending",
            AppError::GamesNotScheduled => "games.not_scheduled",
            AppError::GamesScheduleInPast => "games.schedule_in_past",
            AppError::GamesInvalidDuration => "games.invalid_duration",
            AppError::GamesTeamCountMismatch => "games.team_count_mismatch",
            AppError::GamesBracketGame => "games.bracket_game",
            AppError::GamesCancelForbidden => "games.cancel_forbidden",

            AppError::GameTeamsNotFound => "game_teams.not_found",
            AppError::GameTeamsInvalidGrade => "game_teams.invalid_grade",
            AppError::GameTeamsDuplicateGrade => "game_teams.duplicate_grade",
            AppError::GameTeamsGameFull => "game_teams.game_full",
            AppError::GameTeamsContestFull => "game_teams.contest_full",
            AppError::GameTeamsAlreadyJoined => "game_teams.already_joined",
            AppError::GameTeamsTeamSizeMismatch => "game_teams.team_size_mismatch",
            AppError::GameTeamsWinnerNotInGame => "game_teams.winner_not_in_game",

            AppError::MatchResultsNotFound => "match_results.not_found",
            AppError::MatchResultsInvalidScore => "match_results.invalid_score",

            AppError::ProviderPlayerNotFound => "provider.player_not_found",
            AppError::ProviderMatchNotFound => "provider.match_not_found",
            AppError::ProviderRateLimited => "provider.rate_limited",
            AppError::ProviderUnavailable => "provider.unavailable",

            AppError::TeamsNotFound => "teams.not_found",
        }
    }

    pub const fn message(&self) -> &'static str {
        match self {
            AppError::Unexpected => "An unexpected error has occurred.",

            AppError::BracketsInvalidTeamCount => "The team count must be a power of two.",
            AppError::BracketsAlreadyGenerated => {
                "A bracket has already been generated for this contest."
            }
            AppError::BracketsNotGenerated => "No bracket has been generated for this contest.",
            AppError::BracketsAlreadyAllocated => "Teams have already been allocated.",
            AppError::BracketsNotEnoughTeams => "Not enough teams are registered.",
            AppError::BracketsRegistrationOpen => "Team registration is still open.",

            AppError::ContestsNotFound => "The contest could not be found.",

            AppError::DetectionNotDetecting => "The game is not awaiting detection.",
            AppError::DetectionManualResultNotAllowed => {
                "A result can no longer be submitted for this game."
            }
            AppError::DetectionSideUnresolved => {
                "The tournament teams could not be mapped onto the match sides."
            }
            AppError::DetectionNoWinner => "The match has no declared winner.",
            AppError::DetectionResultAlreadyRecorded => {
                "A result has already been recorded for this game."
            }

            AppError::GamesNotFound => "The game could not be found.",
            AppError::GamesInvalidStatusTransition(_, _) => "Invalid game status transition.",
            AppError::GamesInvalidDetectionTransition(_, _) => {
                "Invalid detection status transition."
            }
            AppError::GamesInvalidTeamType => "The team type must be between 1 and 5 players.",
            AppError::GamesInvalidBracketCoordinates => {
                "Round and match number must be set together."
            }
            AppError::GamesNotPending => "The game has already started.",
            AppError::GamesNotScheduled => "The game has no scheduled start time.",
            AppError::GamesScheduleInPast => "The scheduled start time must be in the future.",
            AppError::GamesInvalidDuration => "A game cannot last longer than two hours.",
            AppError::GamesTeamCountMismatch => "The game does not have exactly two teams.",
            AppError::GamesBracketGame => "Bracket games cannot be modified this way.",
            AppError::GamesCancelForbidden => "Only a participating team leader may cancel.",

            AppError::GameTeamsNotFound => "The game team could not be found.",
            AppError::GameTeamsInvalidGrade => "The grade must be 1 (winner) or 2 (loser).",
            AppError::GameTeamsDuplicateGrade => "Another team already holds this grade.",
            AppError::GameTeamsGameFull => "The game already has two teams.",
            AppError::GameTeamsContestFull => "The contest has reached its team limit.",
            AppError::GameTeamsAlreadyJoined => "The team is already part of this game.",
            AppError::GameTeamsTeamSizeMismatch => {
                "The team size does not match the game's team type."
            }
            AppError::GameTeamsWinnerNotInGame => "The winning team is not part of this game.",

            AppError::MatchResultsNotFound => "The match result could not be found.",
            AppError::MatchResultsInvalidScore => {
                "Scores must be non-negative and the winner must not score less."
            }

            AppError::ProviderPlayerNotFound => "The player could not be found.",
            AppError::ProviderMatchNotFound => "The match could not be found.",
            AppError::ProviderRateLimited => "The match history provider is rate limiting.",
            AppError::ProviderUnavailable => "The match history provider is unavailable.",

            AppError::TeamsNotFound => "The team could not be found.",
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            AppError::BracketsInvalidTeamCount
            | AppError::GamesInvalidTeamType
            | AppError::GamesInvalidBracketCoordinates
            | AppError::GamesScheduleInPast
            | AppError::GamesInvalidDuration
            | AppError::GameTeamsInvalidGrade
            | AppError::MatchResultsInvalidScore => ErrorKind::Validation,

            AppError::BracketsAlreadyGenerated
            | AppError::BracketsNotGenerated
            | AppError::BracketsAlreadyAllocated
            | AppError::BracketsNotEnoughTeams
            | AppError::BracketsRegistrationOpen
            | AppError::DetectionNotDetecting
            | AppError::DetectionResultAlreadyRecorded
            | AppError::GamesInvalidStatusTransition(_, _)
            | AppError::GamesInvalidDetectionTransition(_, _)
            | AppError::GamesNotPending
            | AppError::GamesNotScheduled
            | AppError::GamesTeamCountMismatch
            | AppError::GamesBracketGame
            | AppError::GameTeamsDuplicateGrade
            | AppError::GameTeamsGameFull
            | AppError::GameTeamsContestFull
            | AppError::GameTeamsAlreadyJoined
            | AppError::GameTeamsTeamSizeMismatch => ErrorKind::StateConflict,

            AppError::ContestsNotFound
            | AppError::GamesNotFound
            | AppError::GameTeamsNotFound
            | AppError::MatchResultsNotFound
            | AppError::TeamsNotFound => ErrorKind::NotFound,

            AppError::ProviderPlayerNotFound
            | AppError::ProviderMatchNotFound
            | AppError::ProviderRateLimited
            | AppError::ProviderUnavailable => ErrorKind::ExternalDependency,

            AppError::DetectionManualResultNotAllowed
            | AppError::DetectionSideUnresolved
            | AppError::DetectionNoWinner
            | AppError::GamesCancelForbidden
            | AppError::GameTeamsWinnerNotInGame => ErrorKind::BusinessRule,

            AppError::Unexpected => ErrorKind::Unexpected,
        }
    }

    /// Provider failures the scheduler retries on its next cycle.
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            AppError::ProviderRateLimited | AppError::ProviderUnavailable
        )
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::GamesInvalidStatusTransition(from, to) => {
                write!(f, "{}: {from} -> {to}", self.code())
            }
            AppError::GamesInvalidDetectionTransition(from, to) => {
                write!(f, "{}: {from} -> {to}", self.code())
            }
            _ => write!(f, "{}: {}", self.code(), self.message()),
        }
    }
}
