use mongodb::{bson::doc, options::ClientOptions, Client, Database as MongoDatabase};
use tracing::info;

/// MongoDB connection wrapper
///
/// Holds the client (which owns the connection pool) and the application
/// database handle. Cloning is cheap; both halves are reference counted.
#[derive(Clone)]
pub struct Database {
    pub client: Client,
    pub database: MongoDatabase,
}

impl Database {
    /// Connect to MongoDB and verify the server is reachable
    ///
    /// # Example
    /// ```no_run
    /// # async fn run() -> Result<(), mongodb::error::Error> {
    /// let db = sis_admin::services::database::Database::new("mongodb://localhost:27017", "sis").await?;
    /// # Ok(()) }
    /// ```
    pub async fn new(database_url: &str, db_name: &str) -> Result<Self, mongodb::error::Error> {
        info!("Connecting to MongoDB database {}", db_name);

        let mut client_options = ClientOptions::parse(database_url).await?;
        client_options.app_name = Some("sis-admin-server".to_string());

        let client = Client::with_options(client_options)?;
        let database = client.database(db_name);

        database.run_command(doc! { "ping": 1 }, None).await?;

        info!("MongoDB connection established successfully");

        Ok(Self { client, database })
    }
}
