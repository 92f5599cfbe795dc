use crate::{
    auth::AuthenticatedPlayer,
    db,
    models::Notification,
    quiz::{Confirmation, PendingSaves, QuizProgress, QuizSession},
    websocket::messages::{ClientMessage, ServerMessage},
    ActiveSession, AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;

/// Per-connection state, owned by the receive task
struct Connection {
    session: QuizSession,
    next_notification_id: u64,
    notification_ttl: Duration,
    saves: mpsc::Sender<QuizProgress>,
}

/// WebSocket upgrade handler with authentication
pub async fn handle_websocket(
    player: AuthenticatedPlayer,
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    tracing::info!(
        "WebSocket connection authenticated for player: {} ({})",
        player.username,
        player.session_id
    );
    ws.on_upgrade(move |socket| handle_socket(socket, state, player))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, player: AuthenticatedPlayer) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(100);

    let rng = match state.config.game.grid_seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_rng(&mut rand::rng()),
    };
    let notification_ttl = state.config.notification_ttl();
    let session = QuizSession::new(
        player.username.clone(),
        state.questions.questions(),
        rng,
        notification_ttl,
    );

    state.active_sessions.insert(
        player.session_id,
        ActiveSession {
            username: player.username.clone(),
            started_at: Instant::now(),
        },
    );

    tracing::info!(
        "Quiz session started for player: {} ({})",
        player.username,
        player.session_id
    );

    // Spawn a task to send messages to the client
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                }
            }
        }
    });

    // Results are written one at a time, in answer order
    let (save_tx, save_rx) = mpsc::channel::<QuizProgress>(32);
    tokio::spawn(save_worker(
        state.clone(),
        save_rx,
        session.pending_saves(),
        tx.clone(),
    ));

    let mut connection = Connection {
        session,
        next_notification_id: 0,
        notification_ttl,
        saves: save_tx,
    };

    if let Err(e) = send_question(&connection.session, &tx).await {
        tracing::error!("Failed to send initial question: {}", e);
    }

    // Handle incoming messages from the client
    let player_for_recv = player.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        if let Err(e) =
                            handle_client_message(client_msg, &mut connection, &tx).await
                        {
                            tracing::debug!("Error handling message: {}", e);
                            let error_msg = ServerMessage::Error {
                                message: e.to_string(),
                            };
                            let _ = tx.send(error_msg).await;
                        }
                    }
                    Err(e) => {
                        tracing::error!("Failed to parse message: {}", e);
                        let error_msg = ServerMessage::Error {
                            message: format!("Invalid message format: {}", e),
                        };
                        let _ = tx.send(error_msg).await;
                    }
                },
                Message::Close(_) => {
                    tracing::info!(
                        "Client disconnected: {} ({})",
                        player_for_recv.username,
                        player_for_recv.session_id
                    );
                    break;
                }
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    state.active_sessions.remove(&player.session_id);

    tracing::info!(
        "WebSocket connection closed for player: {} ({})",
        player.username,
        player.session_id
    );
}

/// Handle individual client messages
async fn handle_client_message(
    msg: ClientMessage,
    connection: &mut Connection,
    tx: &mpsc::Sender<ServerMessage>,
) -> anyhow::Result<()> {
    match msg {
        ClientMessage::ToggleCell { position } => {
            connection.session.toggle(position)?;
            send_selection(&connection.session, tx).await?;
        }
        ClientMessage::ClearSelection => {
            connection.session.clear()?;
            send_selection(&connection.session, tx).await?;
        }
        ClientMessage::ConfirmSelection => match connection.session.confirm()? {
            Confirmation::Rejected { notification } => {
                send_notification(connection, notification, tx).await?;
            }
            Confirmation::Answered {
                record,
                notification,
                progress,
                ..
            } => {
                send_notification(connection, notification, tx).await?;
                tx.send(ServerMessage::AnswerRecorded {
                    record,
                    score: progress.score,
                    answered: progress.answers.len(),
                    total: progress.total,
                })
                .await?;

                let pending = connection.session.pending_saves();
                if pending.begin() {
                    tx.send(ServerMessage::Saving { in_flight: true }).await?;
                }
                if let Err(e) = connection.saves.send(progress.clone()).await {
                    pending.finish();
                    return Err(e.into());
                }

                if progress.finished {
                    tx.send(ServerMessage::QuizFinished {
                        username: progress.username.clone(),
                        score: progress.score,
                        total: progress.total,
                        answers: progress.answers.to_vec(),
                    })
                    .await?;
                } else {
                    send_question(&connection.session, tx).await?;
                }
            }
        },
        ClientMessage::RestartQuiz => {
            tracing::info!("Player {} restarting quiz", connection.session.username());
            connection.session.restart();
            send_question(&connection.session, tx).await?;
        }
    }

    Ok(())
}

/// Send the current question, its grid and the (empty) selection
async fn send_question(
    session: &QuizSession,
    tx: &mpsc::Sender<ServerMessage>,
) -> anyhow::Result<()> {
    let (Some(question), Some(engine)) = (session.current_question(), session.engine()) else {
        return Ok(());
    };

    tx.send(ServerMessage::QuestionState {
        question_id: question.id.clone(),
        question: question.question.clone(),
        number: session.question_number(),
        total: session.total_questions(),
        grid: engine.grid().clone(),
        score: session.score(),
    })
    .await?;

    send_selection(session, tx).await
}

async fn send_selection(
    session: &QuizSession,
    tx: &mpsc::Sender<ServerMessage>,
) -> anyhow::Result<()> {
    let Some(engine) = session.engine() else {
        return Ok(());
    };

    tx.send(ServerMessage::SelectionUpdated {
        selection: engine.current_selection().to_vec(),
        spelled_word: engine.spelled_word(),
    })
    .await?;

    Ok(())
}

/// Show a notification and schedule its dismissal.
/// The client drops the dismissal if a newer notification replaced it.
async fn send_notification(
    connection: &mut Connection,
    notification: Notification,
    tx: &mpsc::Sender<ServerMessage>,
) -> anyhow::Result<()> {
    connection.next_notification_id += 1;
    let id = connection.next_notification_id;
    let ttl = connection.notification_ttl;

    tx.send(ServerMessage::Notification {
        id,
        message: notification.message,
        kind: notification.kind,
        expires_in_ms: ttl.as_millis() as u64,
    })
    .await?;

    let tx = tx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(ttl).await;
        let _ = tx.send(ServerMessage::NotificationDismissed { id }).await;
    });

    Ok(())
}

/// Persist progress snapshots in the order they were produced
async fn save_worker(
    state: Arc<AppState>,
    mut saves: mpsc::Receiver<QuizProgress>,
    pending: PendingSaves,
    tx: mpsc::Sender<ServerMessage>,
) {
    while let Some(progress) = saves.recv().await {
        let score = progress.score as i32;
        if let Err(e) = db::queries::upsert_quiz_result(
            &state.db,
            &progress.username,
            &progress.answers,
            score,
        )
        .await
        {
            tracing::error!(
                "Failed to save quiz result for {}: {}",
                progress.username,
                e
            );
            let _ = tx
                .send(ServerMessage::Error {
                    message: "Failed to save your answer".to_string(),
                })
                .await;
        }

        if progress.finished {
            match db::queries::insert_submission(
                &state.db,
                &progress.username,
                &progress.answers,
                score,
            )
            .await
            {
                Ok(submission) => tracing::info!(
                    "Saved final results {} for {}",
                    submission.id,
                    progress.username
                ),
                Err(e) => tracing::error!(
                    "Failed to save final results for {}: {}",
                    progress.username,
                    e
                ),
            }
        }

        if pending.finish() {
            let _ = tx.send(ServerMessage::Saving { in_flight: false }).await;
        }
    }
}
