//! User collection operations

use mongodb::{
    Collection, Database,
    bson::{Bson, DateTime, Document, doc, oid::ObjectId},
};

use crate::entity::user::UserDocument;

pub const USERS_COLLECTION: &str = "users";

/// Repository over the `users` collection of the auth database.
#[derive(Clone)]
pub struct UserRepository {
    collection: Collection<UserDocument>,
}

impl UserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(USERS_COLLECTION),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserDocument>> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    pub async fn find_by_id(&self, id: ObjectId) -> anyhow::Result<Option<UserDocument>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    /// Insert a new user, returning the generated object id.
    pub async fn insert(&self, user: &UserDocument) -> anyhow::Result<ObjectId> {
        let result = self.collection.insert_one(user).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| anyhow::anyhow!("insert did not return an ObjectId"))
    }

    pub async fn mark_verified(&self, email: &str) -> anyhow::Result<()> {
        self.collection
            .update_one(
                doc! { "email": email },
                doc! { "$set": { "is_verified": true, "verification_code": "" } },
            )
            .await?;
        Ok(())
    }

    pub async fn set_reset_code(
        &self,
        email: &str,
        code: &str,
        expires: DateTime,
    ) -> anyhow::Result<()> {
        self.collection
            .update_one(
                doc! { "email": email },
                doc! { "$set": { "reset_code": code, "reset_code_expires": expires } },
            )
            .await?;
        Ok(())
    }

    /// Store a new password hash and clear any pending reset code.
    pub async fn reset_password(&self, id: ObjectId, password_hash: &str) -> anyhow::Result<()> {
        self.collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": {
                    "password_hash": password_hash,
                    "reset_code": Bson::Null,
                    "reset_code_expires": Bson::Null,
                } },
            )
            .await?;
        Ok(())
    }

    pub async fn set_password(&self, id: ObjectId, password_hash: &str) -> anyhow::Result<()> {
        self.collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": {
                    "password_hash": password_hash,
                    "updated_at": DateTime::now(),
                } },
            )
            .await?;
        Ok(())
    }

    /// Apply a `$set` update to a user, returning whether a document matched.
    pub async fn update_fields(&self, id: ObjectId, set: Document) -> anyhow::Result<bool> {
        let result = self
            .collection
            .update_one(doc! { "_id": id }, doc! { "$set": set })
            .await?;
        Ok(result.matched_count > 0)
    }
}
