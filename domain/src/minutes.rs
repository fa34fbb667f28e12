//! Meeting minutes orchestration: summary generation and contextual chat.
//!
//! Both operations come in a blocking form that returns the full answer and a
//! streaming form that yields fragments as the provider produces them. Summaries
//! are written to the summary store; chat answers are not.

use crate::error::Error;
use async_stream::stream;
use futures::{Stream, StreamExt};
use log::*;
use meeting_ai::traits::{chat::Provider, summary_store::Store};
use meeting_ai::{MeetingRecord, Message};
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Fragments of a generated answer. The first `Err` ends the stream.
pub type AnswerStream = Pin<Box<dyn Stream<Item = Result<String, Error>> + Send>>;

type FragmentSender = mpsc::UnboundedSender<Result<String, Error>>;

const NO_SUMMARY_PLACEHOLDER: &str = "暂无会议纪要";

/// The transcript a request is about and the identifiers used to cache and log it.
#[derive(Debug, Clone)]
pub struct Meeting {
    /// Opaque correlation id, only used in logs.
    pub log_id: String,
    pub meeting_id: String,
    /// Plain text produced by `transcript::parse_srt`.
    pub transcript: String,
}

/// Single user message asking for minutes of `transcript`.
pub fn summary_messages(transcript: &str) -> Vec<Message> {
    let prompt = format!(
        "请根据以下会议转写内容，生成一份完整的会议纪要。要求：\n\
         1. 提取会议主题\n\
         2. 总结主要讨论内容\n\
         3. 列出关键决策和行动项\n\
         4. 简洁清晰，重点突出\n\
         \n\
         会议转写内容：\n\
         {transcript}\n\
         \n\
         请生成会议纪要："
    );
    vec![Message::user(prompt)]
}

/// Context message carrying the summary and transcript, followed by the caller's turns.
pub fn chat_messages(summary: &str, transcript: &str, turns: &[Message]) -> Vec<Message> {
    let summary = if summary.is_empty() {
        NO_SUMMARY_PLACEHOLDER
    } else {
        summary
    };
    let context = format!(
        "你是一个会议助手，请基于以下会议信息回答用户的问题：\n\
         \n\
         会议纪要：\n\
         {summary}\n\
         \n\
         会议原文：\n\
         {transcript}\n\
         \n\
         请根据以上信息回答用户问题，如果信息中没有相关内容，请如实告知。"
    );

    let mut messages = Vec::with_capacity(turns.len() + 1);
    messages.push(Message::user(context));
    messages.extend_from_slice(turns);
    messages
}

/// Generate the full summary of `meeting` and store it.
pub async fn summarize(
    provider: &dyn Provider,
    store: &dyn Store,
    meeting: &Meeting,
) -> Result<String, Error> {
    let summary = provider
        .complete(&summary_messages(&meeting.transcript))
        .await?;
    store_summary(store, meeting, summary.clone()).await?;
    info!(
        "[{}] Summary generation completed for meeting {}",
        meeting.log_id, meeting.meeting_id
    );
    Ok(summary)
}

/// [`summarize`] on a spawned task, so the summary is still generated and cached
/// when the caller stops waiting for it.
pub async fn summarize_detached(
    provider: Arc<dyn Provider>,
    store: Arc<dyn Store>,
    meeting: Meeting,
) -> Result<String, Error> {
    tokio::spawn(async move { summarize(provider.as_ref(), store.as_ref(), &meeting).await }).await?
}

/// Stream the summary of `meeting`. The accumulated text is stored once the
/// provider's stream is exhausted; nothing is stored if it fails part-way.
///
/// Generation runs on its own task and keeps going after the returned stream is
/// dropped, so a disconnected caller still leaves a cached summary behind.
pub fn summarize_stream(
    provider: Arc<dyn Provider>,
    store: Arc<dyn Store>,
    meeting: Meeting,
) -> AnswerStream {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        if let Err(e) = stream_summary(provider.as_ref(), store.as_ref(), &meeting, &tx).await {
            let _ = tx.send(Err(e));
        }
    });
    forward(rx)
}

async fn stream_summary(
    provider: &dyn Provider,
    store: &dyn Store,
    meeting: &Meeting,
    tx: &FragmentSender,
) -> Result<(), Error> {
    let mut fragments = provider
        .stream(&summary_messages(&meeting.transcript))
        .await?;

    let mut summary = String::new();
    while let Some(fragment) = fragments.next().await {
        let fragment = fragment?;
        summary.push_str(&fragment);
        // The receiver may be gone; keep pulling so the summary still gets cached.
        let _ = tx.send(Ok(fragment));
    }

    store_summary(store, meeting, summary).await?;
    info!(
        "[{}] Summary generation completed for meeting {}",
        meeting.log_id, meeting.meeting_id
    );
    Ok(())
}

/// Return the cached summary of `meeting`, generating (and caching) it first on a miss.
pub async fn resolve_summary(
    provider: &dyn Provider,
    store: &dyn Store,
    meeting: &Meeting,
) -> Result<String, Error> {
    if let Some(record) = store.get(&meeting.meeting_id).await? {
        info!(
            "[{}] Found cached summary for meeting {}",
            meeting.log_id, meeting.meeting_id
        );
        return Ok(record.summary);
    }

    info!(
        "[{}] No cached summary for meeting {}, generating summary...",
        meeting.log_id, meeting.meeting_id
    );
    // A failed fallback fails the chat request; its error text is never used as a summary.
    summarize(provider, store, meeting).await
}

/// Answer the latest of `turns` from the meeting's summary and transcript.
pub async fn answer(
    provider: &dyn Provider,
    store: &dyn Store,
    meeting: &Meeting,
    turns: &[Message],
) -> Result<String, Error> {
    ensure_turns(turns)?;
    let summary = resolve_summary(provider, store, meeting).await?;
    let answer = provider
        .complete(&chat_messages(&summary, &meeting.transcript, turns))
        .await?;
    info!(
        "[{}] Chat response completed for meeting {}",
        meeting.log_id, meeting.meeting_id
    );
    Ok(answer)
}

/// [`answer`] on a spawned task; a fallback summary it starts is cached even if
/// the caller stops waiting.
pub async fn answer_detached(
    provider: Arc<dyn Provider>,
    store: Arc<dyn Store>,
    meeting: Meeting,
    turns: Vec<Message>,
) -> Result<String, Error> {
    tokio::spawn(async move {
        answer(provider.as_ref(), store.as_ref(), &meeting, &turns).await
    })
    .await?
}

/// Streaming form of [`answer`]. A missing summary is still generated in full
/// before the first fragment of the answer is produced. Like
/// [`summarize_stream`], generation outlives the returned stream.
pub fn answer_stream(
    provider: Arc<dyn Provider>,
    store: Arc<dyn Store>,
    meeting: Meeting,
    turns: Vec<Message>,
) -> AnswerStream {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let result =
            stream_answer(provider.as_ref(), store.as_ref(), &meeting, &turns, &tx).await;
        if let Err(e) = result {
            let _ = tx.send(Err(e));
        }
    });
    forward(rx)
}

async fn stream_answer(
    provider: &dyn Provider,
    store: &dyn Store,
    meeting: &Meeting,
    turns: &[Message],
    tx: &FragmentSender,
) -> Result<(), Error> {
    ensure_turns(turns)?;
    let summary = resolve_summary(provider, store, meeting).await?;

    let messages = chat_messages(&summary, &meeting.transcript, turns);
    let mut fragments = provider.stream(&messages).await?;
    while let Some(fragment) = fragments.next().await {
        let _ = tx.send(Ok(fragment?));
    }

    info!(
        "[{}] Chat response completed for meeting {}",
        meeting.log_id, meeting.meeting_id
    );
    Ok(())
}

/// Yields whatever the generation task sends until it finishes.
fn forward(mut rx: mpsc::UnboundedReceiver<Result<String, Error>>) -> AnswerStream {
    Box::pin(stream! {
        while let Some(fragment) = rx.recv().await {
            yield fragment;
        }
    })
}

fn ensure_turns(turns: &[Message]) -> Result<(), Error> {
    if turns.is_empty() {
        Err(Error::validation("messages must not be empty"))
    } else {
        Ok(())
    }
}

async fn store_summary(store: &dyn Store, meeting: &Meeting, summary: String) -> Result<(), Error> {
    let record = MeetingRecord {
        summary,
        transcript: meeting.transcript.clone(),
    };
    store.put(&meeting.meeting_id, record).await?;
    debug!(
        "[{}] Cached summary for meeting {}",
        meeting.log_id, meeting.meeting_id
    );
    Ok(())
}
