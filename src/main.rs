use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use log::{info, warn};
use tonic::{Request, Response, Status};

use hanafuda_engine::game::{Difficulty, EngineError, VariantConfig};
use hanafuda_engine::proto::hanafuda_server::{Hanafuda, HanafudaServer};
use hanafuda_engine::proto::{
    ActReply, ActRequest, EventMessage, MatchReply, NewMatchRequest, SimulateReply,
    SimulateRequest, StateRequest, StreamRequest, Tensor,
};
use hanafuda_engine::service::{
    action_mask, decode_action, execute, observation, policies_for, run_until_input, simulate,
    snapshot, MatchState, OpponentPolicy, PlayerSeat,
};

const DEFAULT_ADDR: &str = "127.0.0.1:50051";

// ============================================================================
// 對局 session
// ============================================================================

struct Session {
    game: MatchState,
    policies: Vec<Option<OpponentPolicy>>,
    humans: Vec<usize>,
}

fn to_proto(tensor: hanafuda_engine::service::Tensor) -> Tensor {
    Tensor {
        data: tensor.data,
        shape: tensor.shape,
    }
}

fn match_reply(match_id: &str, game: &MatchState, viewer: Option<usize>) -> MatchReply {
    let seat = viewer.unwrap_or(0);
    MatchReply {
        match_id: match_id.to_string(),
        state_json: snapshot(game, viewer).to_json(),
        observation: Some(to_proto(observation(game, seat))),
        action_mask: Some(to_proto(action_mask(game, seat))),
        done: game.is_finished(),
    }
}

fn invalid_argument(err: EngineError) -> Status {
    Status::invalid_argument(err.to_string())
}

fn config_from(req: &NewMatchRequest) -> Result<VariantConfig, EngineError> {
    if !req.config_json.is_empty() {
        return VariantConfig::from_json(&req.config_json);
    }
    let name = if req.preset.is_empty() { "koikoi" } else { req.preset.as_str() };
    VariantConfig::preset(name)
        .ok_or_else(|| EngineError::invalid_config(format!("unknown preset {}", name)))
}

// ============================================================================
// gRPC 服務
// ============================================================================

#[derive(Default)]
struct HanafudaService {
    sessions: DashMap<String, Session>,
    next_id: AtomicU64,
}

#[tonic::async_trait]
impl Hanafuda for HanafudaService {
    async fn new_match(
        &self,
        request: Request<NewMatchRequest>,
    ) -> Result<Response<MatchReply>, Status> {
        let req = request.into_inner();
        let config = config_from(&req).map_err(invalid_argument)?;
        let difficulty = Difficulty::from_name(&req.difficulty).unwrap_or_default();

        let humans: Vec<usize> = if req.human_seats.is_empty() {
            vec![0]
        } else {
            req.human_seats.iter().map(|&s| s as usize).collect()
        };
        let seats: Vec<PlayerSeat> = (0..config.player_count)
            .map(|i| {
                if humans.contains(&i) {
                    PlayerSeat::human(i)
                } else {
                    PlayerSeat::ai(i, difficulty)
                }
            })
            .collect();

        let mut policies = policies_for(&seats, req.seed);
        let mut game = MatchState::new(config, seats, req.seed).map_err(invalid_argument)?;
        run_until_input(&mut game, &mut policies).map_err(|e| Status::internal(e.to_string()))?;

        let match_id = format!("m{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let reply = match_reply(&match_id, &game, humans.first().copied());
        info!("new match {} (seed {}, humans {:?})", match_id, req.seed, humans);
        self.sessions.insert(match_id, Session { game, policies, humans });

        Ok(Response::new(reply))
    }

    async fn act(&self, request: Request<ActRequest>) -> Result<Response<ActReply>, Status> {
        let req = request.into_inner();
        let mut entry = self
            .sessions
            .get_mut(&req.match_id)
            .ok_or_else(|| Status::not_found(format!("no match {}", req.match_id)))?;
        let session = entry.value_mut();
        let seat = req.seat as usize;

        let start = session.game.event_log().len();
        // 玩家輸入錯誤以 accepted = false 回報，不是 transport 錯誤
        let outcome = if session.humans.contains(&seat) {
            decode_action(req.action_type, req.card, seat)
                .and_then(|command| execute(&mut session.game, command))
        } else {
            Err(EngineError::invalid_action(format!("seat {} is not a human seat", seat)))
        };

        let (accepted, error) = match outcome {
            Ok(()) => {
                run_until_input(&mut session.game, &mut session.policies)
                    .map_err(|e| Status::internal(e.to_string()))?;
                (true, String::new())
            }
            Err(err) => {
                warn!("match {}: rejected action from seat {}: {}", req.match_id, seat, err);
                (false, err.to_string())
            }
        };
        let events_json = if accepted {
            session
                .game
                .events_since(start)
                .iter()
                .map(|e| e.to_json())
                .collect()
        } else {
            Vec::new()
        };

        Ok(Response::new(ActReply {
            accepted,
            error,
            events_json,
            state: Some(match_reply(&req.match_id, &session.game, Some(seat))),
        }))
    }

    async fn get_state(
        &self,
        request: Request<StateRequest>,
    ) -> Result<Response<MatchReply>, Status> {
        let req = request.into_inner();
        let entry = self
            .sessions
            .get(&req.match_id)
            .ok_or_else(|| Status::not_found(format!("no match {}", req.match_id)))?;
        let viewer = usize::try_from(req.seat).ok();
        Ok(Response::new(match_reply(&req.match_id, &entry.game, viewer)))
    }

    type StreamEventsStream =
        tokio_stream::Iter<std::vec::IntoIter<Result<EventMessage, Status>>>;

    async fn stream_events(
        &self,
        request: Request<StreamRequest>,
    ) -> Result<Response<Self::StreamEventsStream>, Status> {
        let req = request.into_inner();
        let entry = self
            .sessions
            .get(&req.match_id)
            .ok_or_else(|| Status::not_found(format!("no match {}", req.match_id)))?;
        let from = req.from_index as usize;
        let messages: Vec<Result<EventMessage, Status>> = entry
            .game
            .events_since(from)
            .iter()
            .enumerate()
            .map(|(offset, event)| {
                Ok(EventMessage {
                    index: (from + offset) as u64,
                    kind: event.kind().to_string(),
                    json: event.to_json(),
                })
            })
            .collect();
        Ok(Response::new(tokio_stream::iter(messages)))
    }

    async fn simulate(
        &self,
        request: Request<SimulateRequest>,
    ) -> Result<Response<SimulateReply>, Status> {
        let req = request.into_inner();
        let name = if req.preset.is_empty() { "koikoi" } else { req.preset.as_str() };
        let config = VariantConfig::preset(name)
            .ok_or_else(|| Status::invalid_argument(format!("unknown preset {}", name)))?;
        let difficulties: Vec<Difficulty> = (0..config.player_count)
            .map(|i| {
                req.difficulties
                    .get(i)
                    .and_then(|d| Difficulty::from_name(d))
                    .unwrap_or_default()
            })
            .collect();
        let seeds = req.seed_start..req.seed_end.max(req.seed_start);

        // rayon 批次放在 blocking 執行緒
        let summary = tokio::task::spawn_blocking(move || simulate(&config, &difficulties, seeds))
            .await
            .map_err(|e| Status::internal(e.to_string()))?
            .map_err(invalid_argument)?;

        Ok(Response::new(SimulateReply {
            summary_json: serde_json::to_string(&summary).unwrap_or_default(),
        }))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let addr: std::net::SocketAddr = std::env::var("HANAFUDA_ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()?;
    let service = HanafudaService::default();

    println!("Hanafuda gRPC server listening on {}", addr);
    println!("Variants: koikoi, sakura, hachihachi, shop");

    tonic::transport::Server::builder()
        .add_service(HanafudaServer::new(service))
        .serve(addr)
        .await?;

    Ok(())
}
