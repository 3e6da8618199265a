//! Full model lifecycle over real HTTP.
//!
//! Starts the mock server on a random port, then drives the core `Client`
//! with its ureq-backed `HttpTransport`. The server and an in-process mock
//! client share one store, so both views must agree.

use zendesk_core::{
    ApiError, Client, Config, HttpTransport, Membership, MockStore, MockTransport, Model, Organization, Ticket,
    User,
};

const ADMIN: &str = "admin@acme.com";

fn spawn_server(store: zendesk_core::SharedStore) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, store).await
        })
    });

    format!("http://{addr}")
}

#[test]
fn crud_lifecycle() {
    let store = MockStore::shared(ADMIN);
    let base_url = spawn_server(store.clone());
    let config = Config::new(&base_url, ADMIN).with_token("secret");
    let client = Client::with_transport(config.clone(), HttpTransport::new());
    let local = Client::with_transport(config, MockTransport::with_store(store));

    // Create.
    let mut user = User::new("Ann", "ann@x.com");
    user.save(&client).unwrap();
    let user_id = user.id.unwrap();
    assert_eq!(user.url.as_deref(), Some(format!("{base_url}/api/v2/users/{user_id}.json").as_str()));
    assert_eq!(user.created_at, user.updated_at);

    let organization = client.create(Organization::new("Acme")).unwrap();
    assert_ne!(organization.id, user.id);
    client
        .create(Membership::new(user_id, organization.id.unwrap()))
        .unwrap();

    // Read through both transports.
    let fetched: User = local.get(user_id).unwrap();
    assert_eq!(fetched.organization_id, organization.id);
    assert_eq!(client.list::<User>().unwrap().len(), 1);

    // Update.
    user.notes = Some("prefers email".to_string());
    user.save(&client).unwrap();
    user.reload(&local).unwrap();
    assert_eq!(user.notes.as_deref(), Some("prefers email"));

    // Relationships.
    let ticket = client
        .create(Ticket {
            requester_id: Some(user_id),
            ..Ticket::new("Help", "It broke")
        })
        .unwrap();
    assert_eq!(ticket.organization_id, organization.id);
    assert_eq!(user.tickets(&client).unwrap()[0].id, ticket.id);
    assert_eq!(organization.users(&client).unwrap()[0].id, Some(user_id));
    let me = client.current_user().unwrap();
    assert_eq!(ticket.submitter_id, me.id);

    // Validation errors come back as data, not transport failures.
    let err = User::new("Other", "ann@x.com").save(&client).unwrap_err();
    assert!(matches!(err, ApiError::Invalid { .. }));

    // Delete.
    let mut ticket = ticket;
    ticket.destroy(&client).unwrap();
    assert!(ticket.is_destroyed(&client).unwrap());
    assert!(matches!(client.get::<Ticket>(ticket.id.unwrap()).unwrap_err(), ApiError::NotFound));

    user.destroy(&client).unwrap();
    assert_eq!(user.active, Some(false));
    assert!(user.is_destroyed(&local).unwrap());

    let mut me = me;
    assert!(matches!(me.destroy(&client).unwrap_err(), ApiError::SelfDeletion { .. }));
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = Client::with_transport(Config::new(&format!("http://{addr}"), ADMIN), HttpTransport::new());
    let err = client.list::<User>().unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}
