pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS lti_consumer (
  consumer_pk INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT,
  consumer_key256 TEXT NOT NULL UNIQUE,
  consumer_key TEXT,
  secret TEXT,
  lti_version TEXT,
  consumer_name TEXT,
  consumer_version TEXT,
  consumer_guid TEXT,
  profile TEXT,
  tool_proxy TEXT,
  settings TEXT,
  protected INTEGER NOT NULL DEFAULT 0,
  enabled INTEGER NOT NULL DEFAULT 0,
  enable_from TEXT,
  enable_until TEXT,
  last_access TEXT,
  created TEXT NOT NULL,
  updated TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS lti_context (
  context_pk INTEGER PRIMARY KEY AUTOINCREMENT,
  consumer_pk INTEGER NOT NULL REFERENCES lti_consumer(consumer_pk),
  lti_context_id TEXT NOT NULL,
  settings TEXT,
  created TEXT NOT NULL,
  updated TEXT NOT NULL,
  UNIQUE (consumer_pk, lti_context_id)
);

CREATE TABLE IF NOT EXISTS lti_resource_link (
  resource_link_pk INTEGER PRIMARY KEY AUTOINCREMENT,
  context_pk INTEGER REFERENCES lti_context(context_pk),
  consumer_pk INTEGER REFERENCES lti_consumer(consumer_pk),
  lti_resource_link_id TEXT NOT NULL,
  settings TEXT,
  primary_resource_link_pk INTEGER REFERENCES lti_resource_link(resource_link_pk),
  share_approved INTEGER,
  created TEXT NOT NULL,
  updated TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS lti_user_result (
  user_pk INTEGER PRIMARY KEY AUTOINCREMENT,
  resource_link_pk INTEGER NOT NULL REFERENCES lti_resource_link(resource_link_pk),
  lti_user_id TEXT NOT NULL,
  lti_result_sourcedid TEXT,
  created TEXT NOT NULL,
  updated TEXT NOT NULL,
  UNIQUE (resource_link_pk, lti_user_id)
);

CREATE TABLE IF NOT EXISTS lti_nonce (
  consumer_pk INTEGER NOT NULL REFERENCES lti_consumer(consumer_pk),
  value TEXT NOT NULL,
  expires TEXT NOT NULL,
  PRIMARY KEY (consumer_pk, value)
);

CREATE TABLE IF NOT EXISTS lti_share_key (
  share_key_id TEXT PRIMARY KEY,
  resource_link_pk INTEGER NOT NULL REFERENCES lti_resource_link(resource_link_pk),
  auto_approve INTEGER NOT NULL DEFAULT 0,
  expires TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_resource_link_context ON lti_resource_link(context_pk, lti_resource_link_id);
CREATE INDEX IF NOT EXISTS idx_resource_link_consumer ON lti_resource_link(consumer_pk, lti_resource_link_id);
CREATE INDEX IF NOT EXISTS idx_resource_link_primary ON lti_resource_link(primary_resource_link_pk);
CREATE INDEX IF NOT EXISTS idx_nonce_expires ON lti_nonce(expires);
CREATE INDEX IF NOT EXISTS idx_share_key_expires ON lti_share_key(expires);
"#;
