//! MongoDB-backed complaint store

use async_trait::async_trait;
use bson::{doc, Document};
use tracing::debug;

use super::{CaseLookup, ComplaintStore};
use crate::db::{ComplaintDoc, MongoClient, MongoCollection, TimelineEntry};
use crate::types::Result;

pub struct MongoComplaintStore {
    collection: MongoCollection<ComplaintDoc>,
}

impl MongoComplaintStore {
    /// Open the collection and make sure its indexes exist
    pub async fn new(mongo: &MongoClient, collection_name: &str) -> Result<Self> {
        let collection = mongo.collection::<ComplaintDoc>(collection_name).await?;
        Ok(Self { collection })
    }
}

#[async_trait]
impl ComplaintStore for MongoComplaintStore {
    async fn insert(&self, doc: &ComplaintDoc) -> Result<()> {
        self.collection.insert_one(doc).await
    }

    async fn find(&self, lookup: &CaseLookup) -> Result<Option<ComplaintDoc>> {
        debug!("Finding complaint by {}", lookup);

        let mut filter = Document::new();
        filter.insert(lookup.field(), lookup.value());

        // ObjectIds grow with insertion time, so _id descending is newest first
        self.collection
            .find_one(filter, Some(doc! { "_id": -1 }))
            .await
    }

    async fn append_status(
        &self,
        case_id: &str,
        entry: &TimelineEntry,
    ) -> Result<Option<ComplaintDoc>> {
        let updated_at = bson::to_bson(&entry.date)?;
        let timeline_entry = bson::to_bson(entry)?;

        // One document, one update: status and timeline cannot drift apart
        let update = doc! {
            "$set": { "status": entry.status.as_str(), "updatedAt": updated_at },
            "$push": { "timeline": timeline_entry },
        };

        self.collection
            .find_one_and_update(doc! { "caseId": case_id }, update)
            .await
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }
}
