//! Single binary web server: REST API over in-memory matches and tournament brackets.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080), IDLE_HOURS (e.g. 12).

use actix_web::{
    get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use popdarts_scorer::{
    complete_match, pause_match, resume_match, start_match, start_tournament, ClosestSelection,
    DartRef, DartStatus, MatchController, MatchId, Player, Preferences, RoundDarts, Side,
    SpecialtyShot, Submission, TournamentBracket, TournamentId,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Identifier for a live match session.
type SessionId = Uuid;

/// Session value + last activity time (for auto-cleanup).
struct Entry<T> {
    value: T,
    last_activity: Instant,
}

impl<T> Entry<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            last_activity: Instant::now(),
        }
    }
}

/// A live match, optionally bound to a bracket match.
struct MatchSession {
    controller: MatchController,
    bracket_match: Option<(TournamentId, MatchId)>,
}

#[derive(Default)]
struct Sessions {
    matches: HashMap<SessionId, Entry<MatchSession>>,
    tournaments: HashMap<TournamentId, Entry<TournamentBracket>>,
}

type AppState = Data<RwLock<Sessions>>;

/// Runtime settings read from the environment.
struct ServerConfig {
    host: String,
    port: u16,
    /// Sessions not touched for this long are removed.
    inactivity_timeout: Duration,
}

impl ServerConfig {
    fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let idle_hours: u64 = std::env::var("IDLE_HOURS")
            .ok()
            .and_then(|h| h.parse().ok())
            .unwrap_or(12);
        Self {
            host,
            port,
            inactivity_timeout: Duration::from_secs(idle_hours * 3600),
        }
    }
}

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct PlayerBody {
    name: String,
    #[serde(default)]
    color_ref: String,
}

impl PlayerBody {
    fn into_player(self) -> Player {
        Player::new(self.name, self.color_ref)
    }
}

#[derive(Deserialize)]
struct CreateMatchBody {
    player1: PlayerBody,
    player2: PlayerBody,
    #[serde(default)]
    preferences: Preferences,
    /// Coin flip when absent.
    first_thrower: Option<Side>,
}

#[derive(Deserialize)]
struct ShotBody {
    at: DartRef,
    shot: Option<SpecialtyShot>,
    target: Option<DartRef>,
}

#[derive(Deserialize)]
struct StatusBody {
    at: DartRef,
    status: DartStatus,
}

#[derive(Deserialize)]
struct ClosestBody {
    closest: Option<ClosestSelection>,
}

#[derive(Deserialize)]
struct SubmitBody {
    #[serde(default)]
    confirm_wash: bool,
}

#[derive(Deserialize)]
struct EditRoundBody {
    darts: RoundDarts,
    #[serde(default)]
    confirm_wash: bool,
}

#[derive(Deserialize)]
struct ResetBody {
    first_thrower: Option<Side>,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    players: Vec<PlayerBody>,
}

#[derive(Deserialize)]
struct StartBracketMatchBody {
    #[serde(default)]
    preferences: Preferences,
}

#[derive(Deserialize)]
struct BracketSessionBody {
    session_id: SessionId,
}

/// Path segment: match session id (e.g. /api/matches/{id})
#[derive(Deserialize)]
struct MatchPath {
    id: SessionId,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and bracket match id
#[derive(Deserialize)]
struct BracketMatchPath {
    id: TournamentId,
    match_id: MatchId,
}

fn bad_request(e: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
}

fn not_found(what: &str) -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": format!("No {}", what) }))
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

fn coin_flip() -> Side {
    if rand::random::<bool>() {
        Side::One
    } else {
        Side::Two
    }
}

/// Run `f` against a match session, refreshing its activity time.
fn with_match<F>(state: &AppState, id: SessionId, f: F) -> HttpResponse
where
    F: FnOnce(&mut MatchSession) -> HttpResponse,
{
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.matches.get_mut(&id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            f(&mut entry.value)
        }
        None => not_found("match"),
    }
}

/// Persistence is a stub: completed matches are only logged.
fn record_submission(submission: &Submission) {
    if let Submission::Recorded {
        completed: Some(summary),
        ..
    } = submission
    {
        log::info!(
            "Match summary: {} won {}-{} over {} rounds",
            summary.winner_name,
            summary.player1_score,
            summary.player2_score,
            summary.round_history.len()
        );
    }
}

/// Drop sessions idle past `timeout`; returns how many entries were removed.
///
/// An idle session bound to a bracket match is paused into its bracket first,
/// so the bracket is not left with a match in progress that nobody can reach.
/// A tournament stays while any live session still plays one of its matches,
/// and sessions of a dropped tournament go with it.
fn sweep_idle(sessions: &mut Sessions, timeout: Duration) -> usize {
    let before = sessions.matches.len() + sessions.tournaments.len();
    let Sessions {
        matches,
        tournaments,
    } = &mut *sessions;

    matches.retain(|id, entry| {
        if entry.last_activity.elapsed() < timeout {
            return true;
        }
        if let Some((tournament_id, match_id)) = entry.value.bracket_match {
            if let Some(t) = tournaments.get_mut(&tournament_id) {
                let bracket = &mut t.value;
                if let Err(e) = pause_match(bracket, match_id, &entry.value.controller.state) {
                    log::warn!("Idle session {} could not be paused: {}", id, e);
                    if bracket.active_match == Some(match_id) {
                        bracket.active_match = None;
                    }
                }
            }
        }
        false
    });

    tournaments.retain(|id, entry| {
        entry.last_activity.elapsed() < timeout
            || matches
                .values()
                .any(|m| m.value.bracket_match.is_some_and(|(t, _)| t == *id))
    });
    matches.retain(|_, entry| {
        entry
            .value
            .bracket_match
            .map_or(true, |(t, _)| tournaments.contains_key(&t))
    });

    before - (sessions.matches.len() + sessions.tournaments.len())
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "popdarts-scorer",
    })
}

/// Create a match (returns it with id; client stores id for subsequent requests).
#[post("/api/matches")]
async fn api_create_match(state: AppState, body: Json<CreateMatchBody>) -> HttpResponse {
    let body = body.into_inner();
    let first_thrower = body.first_thrower.unwrap_or_else(coin_flip);
    let controller = match MatchController::new(
        body.player1.into_player(),
        body.player2.into_player(),
        body.preferences.input_mode(),
        first_thrower,
    ) {
        Ok(c) => c,
        Err(e) => return bad_request(e),
    };
    let id = Uuid::new_v4();
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let response = HttpResponse::Ok().json(serde_json::json!({ "id": id, "match": &controller }));
    g.matches.insert(
        id,
        Entry::new(MatchSession {
            controller,
            bracket_match: None,
        }),
    );
    response
}

#[get("/api/matches/{id}")]
async fn api_get_match(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    with_match(&state, path.id, |s| HttpResponse::Ok().json(&s.controller))
}

#[post("/api/matches/{id}/darts/tap")]
async fn api_tap_dart(state: AppState, path: Path<MatchPath>, body: Json<DartRef>) -> HttpResponse {
    with_match(&state, path.id, |s| match s.controller.tap_dart(*body) {
        Ok(()) => HttpResponse::Ok().json(&s.controller),
        Err(e) => bad_request(e),
    })
}

#[put("/api/matches/{id}/darts/status")]
async fn api_set_status(state: AppState, path: Path<MatchPath>, body: Json<StatusBody>) -> HttpResponse {
    with_match(&state, path.id, |s| {
        match s.controller.set_status(body.at, body.status) {
            Ok(()) => HttpResponse::Ok().json(&s.controller),
            Err(e) => bad_request(e),
        }
    })
}

#[put("/api/matches/{id}/darts/shot")]
async fn api_set_shot(state: AppState, path: Path<MatchPath>, body: Json<ShotBody>) -> HttpResponse {
    with_match(&state, path.id, |s| {
        match s.controller.set_shot(body.at, body.shot, body.target) {
            Ok(()) => HttpResponse::Ok().json(&s.controller),
            Err(e) => bad_request(e),
        }
    })
}

#[put("/api/matches/{id}/closest")]
async fn api_set_closest(state: AppState, path: Path<MatchPath>, body: Json<ClosestBody>) -> HttpResponse {
    with_match(&state, path.id, |s| match s.controller.set_closest(body.closest) {
        Ok(()) => HttpResponse::Ok().json(&s.controller),
        Err(e) => bad_request(e),
    })
}

/// Round summary for display before commit.
#[get("/api/matches/{id}/preview")]
async fn api_preview_round(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    with_match(&state, path.id, |s| match s.controller.preview() {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => bad_request(e),
    })
}

#[post("/api/matches/{id}/rounds/submit")]
async fn api_submit_round(state: AppState, path: Path<MatchPath>, body: Json<SubmitBody>) -> HttpResponse {
    with_match(&state, path.id, |s| match s.controller.submit_round(body.confirm_wash) {
        Ok(submission) => {
            record_submission(&submission);
            HttpResponse::Ok().json(serde_json::json!({ "submission": submission, "match": &s.controller }))
        }
        Err(e) => bad_request(e),
    })
}

#[post("/api/matches/{id}/rounds/discard")]
async fn api_discard_round(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    with_match(&state, path.id, |s| {
        s.controller.discard_round();
        HttpResponse::Ok().json(&s.controller)
    })
}

/// Darts of the previous round, for the edit screen.
#[get("/api/matches/{id}/rounds/last")]
async fn api_get_last_round(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    with_match(&state, path.id, |s| match s.controller.last_round_darts() {
        Some(darts) => HttpResponse::Ok().json(darts),
        None => not_found("previous round"),
    })
}

#[put("/api/matches/{id}/rounds/last")]
async fn api_edit_last_round(state: AppState, path: Path<MatchPath>, body: Json<EditRoundBody>) -> HttpResponse {
    let body = body.into_inner();
    with_match(&state, path.id, |s| {
        match s.controller.edit_last_round(body.darts, body.confirm_wash) {
            Ok(submission) => {
                record_submission(&submission);
                HttpResponse::Ok().json(serde_json::json!({ "submission": submission, "match": &s.controller }))
            }
            Err(e) => bad_request(e),
        }
    })
}

/// Rematch: same players, scores and history cleared.
#[post("/api/matches/{id}/reset")]
async fn api_reset_match(state: AppState, path: Path<MatchPath>, body: Option<Json<ResetBody>>) -> HttpResponse {
    let first_thrower = body
        .and_then(|b| b.first_thrower)
        .unwrap_or_else(coin_flip);
    with_match(&state, path.id, |s| {
        s.controller.reset_match(first_thrower);
        HttpResponse::Ok().json(&s.controller)
    })
}

/// Seed a new bracket from the entered players.
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    let body = body.into_inner();
    let players = body.players.into_iter().map(PlayerBody::into_player).collect();
    let bracket = match start_tournament(players) {
        Ok(b) => b,
        Err(e) => return bad_request(e),
    };
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let response = HttpResponse::Ok().json(&bracket);
    g.tournaments.insert(bracket.id, Entry::new(bracket));
    response
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.tournaments.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(&entry.value)
        }
        None => not_found("tournament"),
    }
}

/// Start (or resume, if paused) a bracket match; opens a live match session for it.
#[post("/api/tournaments/{id}/matches/{match_id}/start")]
async fn api_start_bracket_match(
    state: AppState,
    path: Path<BracketMatchPath>,
    body: Option<Json<StartBracketMatchBody>>,
) -> HttpResponse {
    let mode = body
        .map(|b| b.preferences.input_mode())
        .unwrap_or_default();
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let bound = Some((path.id, path.match_id));
    if let Some((session_id, entry)) = g
        .matches
        .iter_mut()
        .find(|(_, entry)| entry.value.bracket_match == bound)
    {
        // Starting a match that already has a live session hands that session back.
        entry.last_activity = Instant::now();
        let body = serde_json::json!({ "session_id": *session_id, "match": &entry.value.controller });
        return HttpResponse::Ok().json(body);
    }
    let entry = match g.tournaments.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found("tournament"),
    };
    entry.last_activity = Instant::now();
    let bracket = &mut entry.value;

    let paused = bracket
        .find_match(path.match_id)
        .is_some_and(|m| m.is_paused());
    let controller = if paused {
        let (p1, p2) = match bracket.find_match(path.match_id).and_then(|m| m.players()) {
            Some((p1, p2)) => (p1.clone(), p2.clone()),
            None => return bad_request("Match is still waiting for players"),
        };
        let snapshot = match resume_match(bracket, path.match_id) {
            Ok(s) => s,
            Err(e) => return bad_request(e),
        };
        MatchController::resume(p1, p2, mode, snapshot)
    } else {
        // Rejected starts are no-ops; the bracket is returned unchanged.
        let Some((p1, p2)) = start_match(bracket, path.match_id) else {
            return HttpResponse::Ok().json(serde_json::json!({ "session_id": null, "bracket": &*bracket }));
        };
        MatchController::new(p1, p2, mode, coin_flip())
    };
    let controller = match controller {
        Ok(c) => c,
        Err(e) => return bad_request(e),
    };

    let session_id = Uuid::new_v4();
    let response = HttpResponse::Ok().json(serde_json::json!({
        "session_id": session_id,
        "match": &controller,
        "bracket": &*bracket,
    }));
    g.matches.insert(
        session_id,
        Entry::new(MatchSession {
            controller,
            bracket_match: Some((path.id, path.match_id)),
        }),
    );
    response
}

/// Pause a bracket match: its live state is stored on the bracket and the session closed.
#[post("/api/tournaments/{id}/matches/{match_id}/pause")]
async fn api_pause_bracket_match(
    state: AppState,
    path: Path<BracketMatchPath>,
    body: Json<BracketSessionBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let snapshot = match g.matches.get(&body.session_id) {
        Some(entry) if entry.value.bracket_match == Some((path.id, path.match_id)) => {
            entry.value.controller.state.clone()
        }
        _ => return not_found("match session for this bracket match"),
    };
    let entry = match g.tournaments.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found("tournament"),
    };
    entry.last_activity = Instant::now();
    if let Err(e) = pause_match(&mut entry.value, path.match_id, &snapshot) {
        return bad_request(e);
    }
    let response = HttpResponse::Ok().json(&entry.value);
    g.matches.remove(&body.session_id);
    response
}

/// Complete a bracket match from its finished session and advance the winner.
#[post("/api/tournaments/{id}/matches/{match_id}/complete")]
async fn api_complete_bracket_match(
    state: AppState,
    path: Path<BracketMatchPath>,
    body: Json<BracketSessionBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let (winner, scores) = match g.matches.get(&body.session_id) {
        Some(entry) if entry.value.bracket_match == Some((path.id, path.match_id)) => {
            let c = &entry.value.controller;
            match c.winner {
                Some(w) => (w, (c.state.player1_score, c.state.player2_score)),
                None => return bad_request("Match has no winner yet"),
            }
        }
        _ => return not_found("match session for this bracket match"),
    };
    let entry = match g.tournaments.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found("tournament"),
    };
    entry.last_activity = Instant::now();
    let advancement = match complete_match(&mut entry.value, path.match_id, winner, scores) {
        Ok(a) => a,
        Err(e) => return bad_request(e),
    };
    let response = HttpResponse::Ok().json(serde_json::json!({
        "advancement": advancement,
        "bracket": &entry.value,
    }));
    g.matches.remove(&body.session_id);
    response
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state: AppState = Data::new(RwLock::new(Sessions::default()));

    // Background task: every 30 minutes, remove sessions idle past the timeout
    let state_cleanup = state.clone();
    let timeout = config.inactivity_timeout;
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let removed = sweep_idle(&mut g, timeout);
            if removed > 0 {
                log::info!("Cleaned up {} inactive session(s)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_match)
            .service(api_get_match)
            .service(api_tap_dart)
            .service(api_set_status)
            .service(api_set_shot)
            .service(api_set_closest)
            .service(api_preview_round)
            .service(api_submit_round)
            .service(api_discard_round)
            .service(api_get_last_round)
            .service(api_edit_last_round)
            .service(api_reset_match)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_start_bracket_match)
            .service(api_pause_bracket_match)
            .service(api_complete_bracket_match)
    })
    .bind(bind)?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use popdarts_scorer::{BracketError, InputMode};

    const HOUR: Duration = Duration::from_secs(3600);

    fn stale<T>(value: T) -> Entry<T> {
        let mut entry = Entry::new(value);
        entry.last_activity = Instant::now().checked_sub(2 * HOUR).unwrap();
        entry
    }

    /// A tournament with its first match started in a live session scored 7-3.
    fn bracket_in_play(
        sessions: &mut Sessions,
        session: fn(MatchSession) -> Entry<MatchSession>,
    ) -> (TournamentId, MatchId) {
        let players = ["Ada", "Bo", "Cy", "Di"].map(|n| Player::new(n, "")).to_vec();
        let mut bracket = start_tournament(players).unwrap();
        let match_id = bracket.rounds[0][0].id;
        let (p1, p2) = start_match(&mut bracket, match_id).unwrap();
        let mut controller = MatchController::new(p1, p2, InputMode::Casual, Side::One).unwrap();
        controller.state.player1_score = 7;
        controller.state.player2_score = 3;

        let tournament_id = bracket.id;
        sessions.tournaments.insert(tournament_id, Entry::new(bracket));
        sessions.matches.insert(
            Uuid::new_v4(),
            session(MatchSession {
                controller,
                bracket_match: Some((tournament_id, match_id)),
            }),
        );
        (tournament_id, match_id)
    }

    #[test]
    fn idle_bracket_session_is_paused_into_its_bracket() {
        let mut sessions = Sessions::default();
        let (tournament_id, match_id) = bracket_in_play(&mut sessions, stale);

        assert_eq!(sweep_idle(&mut sessions, HOUR), 1);
        assert!(sessions.matches.is_empty());

        let bracket = &mut sessions.tournaments.get_mut(&tournament_id).unwrap().value;
        assert_eq!(bracket.active_match, None);
        let paused = bracket.find_match(match_id).unwrap();
        assert!(paused.is_paused());
        assert_eq!((paused.player1_score, paused.player2_score), (7, 3));

        let other = bracket.rounds[0][1].id;
        assert!(start_match(bracket, other).is_some());
        assert_eq!(
            resume_match(bracket, match_id),
            Err(BracketError::AnotherMatchInProgress(other))
        );
    }

    #[test]
    fn tournament_stays_while_its_session_is_live() {
        let mut sessions = Sessions::default();
        let (tournament_id, _) = bracket_in_play(&mut sessions, Entry::new);
        sessions
            .tournaments
            .get_mut(&tournament_id)
            .unwrap()
            .last_activity = Instant::now().checked_sub(2 * HOUR).unwrap();

        assert_eq!(sweep_idle(&mut sessions, HOUR), 0);
        assert_eq!(sessions.matches.len(), 1);
        assert!(sessions.tournaments.contains_key(&tournament_id));

        assert_eq!(sweep_idle(&mut sessions, Duration::ZERO), 2);
        assert!(sessions.matches.is_empty());
        assert!(sessions.tournaments.is_empty());
    }
}
