//! Shared fakes for integration tests

#![allow(dead_code)]

use std::sync::Mutex;

use uuid::Uuid;

use meshconn::domain::{Connection, ConnectionPage, NewConnection, PageRequest, PageSize};
use meshconn::infrastructure::traits::{ApiError, ApiResult, ConnectionApi};

/// In-memory connection store that behaves like the server's search and paging.
#[derive(Default)]
pub struct FakeApi {
    connections: Mutex<Vec<Connection>>,
    requests: Mutex<Vec<PageRequest>>,
    deleted: Mutex<Vec<Uuid>>,
    created: Mutex<Vec<NewConnection>>,
    fail_with: Option<ApiError>,
}

impl FakeApi {
    pub fn with_connections(connections: Vec<Connection>) -> Self {
        Self {
            connections: Mutex::new(connections),
            ..Default::default()
        }
    }

    pub fn failing(error: ApiError) -> Self {
        Self {
            fail_with: Some(error),
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<Uuid> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<NewConnection> {
        self.created.lock().unwrap().clone()
    }

    pub fn stored(&self) -> Vec<Connection> {
        self.connections.lock().unwrap().clone()
    }

    fn check(&self) -> ApiResult<()> {
        match &self.fail_with {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

impl ConnectionApi for FakeApi {
    fn list(&self, request: &PageRequest) -> ApiResult<ConnectionPage> {
        self.requests.lock().unwrap().push(request.clone());
        self.check()?;

        let matching: Vec<Connection> = self
            .stored()
            .into_iter()
            .filter(|c| match &request.search {
                Some(term) => c.name.to_lowercase().contains(&term.to_lowercase()),
                None => true,
            })
            .collect();
        let total_count = matching.len() as u64;

        let (connections, page_size) = match request.page_size {
            PageSize::All => {
                let size = matching.len() as u32;
                (matching, size)
            }
            PageSize::Limit(n) => (
                matching
                    .into_iter()
                    .skip((request.api_page() * n) as usize)
                    .take(n as usize)
                    .collect(),
                n,
            ),
        };

        Ok(ConnectionPage {
            connections,
            total_count,
            page: request.api_page(),
            page_size,
        })
    }

    fn delete(&self, id: Uuid) -> ApiResult<()> {
        self.check()?;
        let mut connections = self.connections.lock().unwrap();
        let before = connections.len();
        connections.retain(|c| c.id != id);
        if connections.len() == before {
            return Err(ApiError::NotFound(format!("connection {id}")));
        }
        self.deleted.lock().unwrap().push(id);
        Ok(())
    }

    fn create(&self, connection: &NewConnection) -> ApiResult<Connection> {
        self.check()?;
        self.created.lock().unwrap().push(connection.clone());
        let stored = Connection {
            id: Uuid::new_v4(),
            name: connection.name.clone(),
            kind: connection.kind.clone(),
            connection_type: connection.connection_type.clone(),
            sub_type: connection.sub_type.clone(),
            status: "discovered".into(),
            credential_id: None,
            created_at: None,
            updated_at: None,
        };
        self.connections.lock().unwrap().push(stored.clone());
        Ok(stored)
    }
}

/// A connected kubernetes connection with a fresh id.
pub fn connection(name: &str) -> Connection {
    Connection {
        id: Uuid::new_v4(),
        name: name.to_string(),
        kind: "kubernetes".into(),
        connection_type: "platform".into(),
        sub_type: "orchestration".into(),
        status: "connected".into(),
        credential_id: None,
        created_at: None,
        updated_at: None,
    }
}

/// `count` connections named `cluster-1` .. `cluster-<count>`.
pub fn connections(count: usize) -> Vec<Connection> {
    (1..=count).map(|i| connection(&format!("cluster-{i}"))).collect()
}
