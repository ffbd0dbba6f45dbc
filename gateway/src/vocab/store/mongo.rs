use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
  options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
  Client, Collection, IndexModel,
};
use serde::{Deserialize, Serialize};

use crate::{
  error::AppResult,
  vocab::{MissedWord, NewMissedWord},
};

use super::MissedWordStore;

const COLLECTION: &str = "missed_words";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MissedWordDocument {
  #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
  id: Option<ObjectId>,
  language: String,
  image_path: String,
  english_word: String,
  translation: String,
  correct_guesses: i32,
  #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
  timestamp: DateTime<Utc>,
}

impl From<MissedWordDocument> for MissedWord {
  fn from(document: MissedWordDocument) -> Self {
    Self {
      id: document.id.map(|id| id.to_hex()).unwrap_or_default(),
      language: document.language,
      image_path: document.image_path,
      english_word: document.english_word,
      translation: document.translation,
      correct_guesses: document.correct_guesses,
      timestamp: document.timestamp,
    }
  }
}

#[derive(Debug, Clone)]
pub struct MongoStore {
  collection: Collection<MissedWordDocument>,
}

impl MongoStore {
  pub async fn connect(uri: &str, database: &str) -> AppResult<Self> {
    let client = Client::with_uri_str(uri).await?;
    let collection = client
      .database(database)
      .collection::<MissedWordDocument>(COLLECTION);

    collection
      .create_index(
        IndexModel::builder()
          .keys(doc! { "language": 1, "timestamp": 1 })
          .options(
            IndexOptions::builder()
              .name("language_timestamp".to_owned())
              .build(),
          )
          .build(),
        None,
      )
      .await?;

    Ok(Self { collection })
  }
}

#[async_trait]
impl MissedWordStore for MongoStore {
  async fn insert(&self, word: NewMissedWord, timestamp: DateTime<Utc>) -> AppResult<String> {
    let document = MissedWordDocument {
      id: None,
      language: word.language,
      image_path: word.image_path,
      english_word: word.english_word,
      translation: word.translation,
      correct_guesses: 0,
      timestamp,
    };
    let res = self.collection.insert_one(document, None).await?;
    Ok(
      res
        .inserted_id
        .as_object_id()
        .map(|id| id.to_hex())
        .unwrap_or_else(|| res.inserted_id.to_string()),
    )
  }

  async fn find_by_language(&self, language: &str, limit: i64) -> AppResult<Vec<MissedWord>> {
    let options = FindOptions::builder()
      .sort(doc! { "timestamp": 1 })
      .limit(limit)
      .build();
    let documents: Vec<MissedWordDocument> = self
      .collection
      .find(doc! { "language": language }, options)
      .await?
      .try_collect()
      .await?;
    Ok(documents.into_iter().map(MissedWord::from).collect())
  }

  async fn get(&self, id: &str) -> AppResult<Option<MissedWord>> {
    let Ok(id) = ObjectId::parse_str(id) else {
      return Ok(None);
    };
    let document = self.collection.find_one(doc! { "_id": id }, None).await?;
    Ok(document.map(MissedWord::from))
  }

  async fn increment(&self, id: &str) -> AppResult<Option<i32>> {
    let Ok(id) = ObjectId::parse_str(id) else {
      return Ok(None);
    };
    let options = FindOneAndUpdateOptions::builder()
      .return_document(ReturnDocument::After)
      .build();
    let document = self
      .collection
      .find_one_and_update(
        doc! { "_id": id },
        doc! { "$inc": { "correct_guesses": 1 } },
        options,
      )
      .await?;
    Ok(document.map(|document| document.correct_guesses))
  }

  async fn delete_if_mastered(&self, id: &str, threshold: i32) -> AppResult<bool> {
    let Ok(id) = ObjectId::parse_str(id) else {
      return Ok(false);
    };
    let res = self
      .collection
      .delete_one(
        doc! { "_id": id, "correct_guesses": { "$gte": threshold } },
        None,
      )
      .await?;
    Ok(res.deleted_count > 0)
  }
}
