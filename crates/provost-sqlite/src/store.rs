use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use provost_core::connector::DataConnector;
use provost_core::errors::{Result, StoreError};
use provost_core::model::{
    Consumer, ConsumerNonce, Context, ResourceLink, ResourceLinkShare, ResourceLinkShareKey,
    UserResult,
};
use rusqlite::Connection;

use crate::store_internal::{
    consumers, contexts, nonces, resource_links, run_cascade, share_keys, sql_err, users,
    CascadeStep,
};

/// SQLite-backed data connector. Cheap to clone; all clones share one
/// serialized connection.
#[derive(Clone)]
pub struct Store {
    pub conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(sql_err)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(sql_err)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(crate::schema::DDL).map_err(sql_err)
    }

    /// Run one entity's delete cascade as a single unit of work.
    fn cascade(&self, steps: &[CascadeStep], id: i64) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction().map_err(sql_err)?;
        run_cascade(&tx, steps, id)?;
        tx.commit().map_err(sql_err)?;
        Ok(())
    }
}

impl DataConnector for Store {
    fn load_consumer(&self, consumer: &mut Consumer) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        consumers::load(&conn, consumer)
    }

    fn save_consumer(&self, consumer: &mut Consumer) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        consumers::save(&conn, consumer, Utc::now())
    }

    fn delete_consumer(&self, consumer: &mut Consumer) -> Result<()> {
        let id = consumer.record_id.ok_or_else(|| {
            StoreError::Constraint("consumer delete requires a record id".to_string())
        })?;
        self.cascade(consumers::DELETE_STEPS, id)?;
        tracing::debug!("deleted consumer {id} and every dependant");
        consumer.reset();
        Ok(())
    }

    fn list_consumers(&self) -> Result<Vec<Consumer>> {
        let conn = self.conn.lock().unwrap();
        consumers::list(&conn)
    }

    fn load_context(&self, context: &mut Context) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        contexts::load(&conn, context)
    }

    fn save_context(&self, context: &mut Context) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        contexts::save(&conn, context, Utc::now())
    }

    fn delete_context(&self, context: &mut Context) -> Result<()> {
        let id = context.record_id.ok_or_else(|| {
            StoreError::Constraint("context delete requires a record id".to_string())
        })?;
        self.cascade(contexts::DELETE_STEPS, id)?;
        tracing::debug!("deleted context {id} and every dependant");
        context.reset();
        Ok(())
    }

    fn load_resource_link(&self, link: &mut ResourceLink) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        resource_links::load(&conn, link)
    }

    fn save_resource_link(&self, link: &mut ResourceLink) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        resource_links::save(&conn, link, Utc::now())
    }

    fn delete_resource_link(&self, link: &mut ResourceLink) -> Result<()> {
        let id = link.record_id.ok_or_else(|| {
            StoreError::Constraint("resource link delete requires a record id".to_string())
        })?;
        self.cascade(resource_links::DELETE_STEPS, id)?;
        link.reset();
        Ok(())
    }

    fn user_results(&self, link: &ResourceLink, local_only: bool) -> Result<Vec<UserResult>> {
        let id = link.record_id.ok_or_else(|| {
            StoreError::Constraint("user listing requires a persisted resource link".to_string())
        })?;
        let conn = self.conn.lock().unwrap();
        resource_links::user_results(&conn, id, local_only)
    }

    fn shares(&self, link: &ResourceLink) -> Result<Vec<ResourceLinkShare>> {
        let id = link.record_id.ok_or_else(|| {
            StoreError::Constraint("share listing requires a persisted resource link".to_string())
        })?;
        let conn = self.conn.lock().unwrap();
        resource_links::shares(&conn, id)
    }

    fn load_nonce(&self, nonce: &ConsumerNonce) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        // lazy sweep; a failing purge must not block the replay check
        if let Err(e) = nonces::purge(&conn, Utc::now()) {
            tracing::warn!("expired-nonce purge failed: {e}");
        }
        nonces::exists(&conn, nonce)
    }

    fn save_nonce(&self, nonce: &ConsumerNonce) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        nonces::insert(&conn, nonce)
    }

    fn purge_nonces(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        nonces::purge(&conn, Utc::now())
    }

    fn load_share_key(&self, share_key: &mut ResourceLinkShareKey) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        if let Err(e) = share_keys::purge(&conn, Utc::now()) {
            tracing::warn!("expired-share-key purge failed: {e}");
        }
        share_keys::load(&conn, share_key)
    }

    fn save_share_key(&self, share_key: &ResourceLinkShareKey) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        share_keys::insert(&conn, share_key)
    }

    fn delete_share_key(&self, share_key: &mut ResourceLinkShareKey) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        share_keys::delete(&conn, share_key)?;
        share_key.reset();
        Ok(())
    }

    fn purge_share_keys(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        share_keys::purge(&conn, Utc::now())
    }

    fn load_user(&self, user: &mut UserResult) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        users::load(&conn, user)
    }

    fn save_user(&self, user: &mut UserResult) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        users::save(&conn, user, Utc::now())
    }

    fn delete_user(&self, user: &mut UserResult) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        users::delete(&conn, user)?;
        user.reset();
        Ok(())
    }
}
