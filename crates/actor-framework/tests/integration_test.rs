use actor_framework::{ActorEntity, Change, FrameworkError, ResourceActor};
use async_trait::async_trait;

// --- Test Entity ---

#[derive(Clone, Debug, PartialEq)]
struct Locker {
    id: u32,
    tag: String,
    capacity: u32,
    used: u32,
}

#[derive(Debug)]
struct LockerCreate {
    tag: String,
    capacity: u32,
}

#[derive(Debug)]
struct LockerUpdate {
    tag: Option<String>,
}

#[derive(Debug)]
enum LockerAction {
    /// Fills `n` slots one at a time, so a failure happens after partial work.
    Fill(u32),
    Peek,
}

#[derive(Debug, thiserror::Error, PartialEq)]
enum LockerError {
    #[error("locker full after {0} slots")]
    Full(u32),
    #[error("tag must not be empty")]
    EmptyTag,
}

#[async_trait]
impl ActorEntity for Locker {
    type Id = u32;
    type Create = LockerCreate;
    type Update = LockerUpdate;
    type Action = LockerAction;
    type ActionResult = u32;
    type Context = ();
    type Error = LockerError;

    fn from_create_params(id: u32, params: LockerCreate) -> Result<Self, Self::Error> {
        if params.tag.is_empty() {
            return Err(LockerError::EmptyTag);
        }
        Ok(Self {
            id,
            tag: params.tag,
            capacity: params.capacity,
            used: 0,
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.tag.clone())
    }

    fn action_mutates(action: &LockerAction) -> bool {
        !matches!(action, LockerAction::Peek)
    }

    async fn on_update(&mut self, update: LockerUpdate, _: &()) -> Result<(), Self::Error> {
        if let Some(tag) = update.tag {
            self.tag = tag;
        }
        Ok(())
    }

    async fn handle_action(&mut self, action: LockerAction, _: &()) -> Result<u32, Self::Error> {
        match action {
            LockerAction::Fill(n) => {
                for _ in 0..n {
                    if self.used == self.capacity {
                        return Err(LockerError::Full(self.used));
                    }
                    self.used += 1;
                }
                Ok(self.used)
            }
            LockerAction::Peek => Ok(self.used),
        }
    }
}

fn locker(tag: &str, capacity: u32) -> LockerCreate {
    LockerCreate {
        tag: tag.to_string(),
        capacity,
    }
}

// --- Tests ---

#[tokio::test]
async fn test_framework_full_lifecycle() {
    let (actor, client) = ResourceActor::<Locker>::new(10);
    tokio::spawn(actor.run(()));

    let id = client.create(locker("A1", 4)).await.unwrap();
    assert_eq!(id, 1);

    assert_eq!(client.perform_action(id, LockerAction::Fill(2)).await.unwrap(), 2);

    let updated = client
        .update(
            id,
            LockerUpdate {
                tag: Some("B7".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.tag, "B7");
    assert_eq!(updated.used, 2);

    client.delete(id).await.unwrap();
    assert!(client.get(id).await.unwrap().is_none());
    assert!(matches!(
        client.delete(id).await,
        Err(FrameworkError::NotFound(_))
    ));
}

#[tokio::test]
async fn failed_action_leaves_entity_unchanged() {
    let (actor, client) = ResourceActor::<Locker>::new(10);
    tokio::spawn(actor.run(()));

    let id = client.create(locker("A1", 3)).await.unwrap();
    client.perform_action(id, LockerAction::Fill(1)).await.unwrap();
    let before = client.get(id).await.unwrap().unwrap();

    // Two of the three slots would fill before the hook fails.
    let err = client
        .perform_action(id, LockerAction::Fill(3))
        .await
        .unwrap_err();
    assert_eq!(err.downcast_entity::<LockerError>().unwrap(), LockerError::Full(3));

    let after = client.get(id).await.unwrap().unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn unique_keys_are_enforced_on_create_and_update() {
    let (actor, client) = ResourceActor::<Locker>::new(10);
    tokio::spawn(actor.run(()));

    let first = client.create(locker("A1", 1)).await.unwrap();
    let second = client.create(locker("A2", 1)).await.unwrap();

    assert!(matches!(
        client.create(locker("A1", 9)).await,
        Err(FrameworkError::Conflict(key)) if key == "A1"
    ));
    assert!(matches!(
        client
            .update(second, LockerUpdate { tag: Some("A1".into()) })
            .await,
        Err(FrameworkError::Conflict(_))
    ));

    // Re-saving its own key is not a conflict.
    client
        .update(first, LockerUpdate { tag: Some("A1".into()) })
        .await
        .unwrap();
}

#[tokio::test]
async fn rejected_create_still_consumes_the_id() {
    let (actor, client) = ResourceActor::<Locker>::new(10);
    tokio::spawn(actor.run(()));

    assert!(client.create(locker("", 1)).await.is_err());
    assert_eq!(client.create(locker("A1", 1)).await.unwrap(), 2);
}

#[tokio::test]
async fn list_is_filtered_and_ordered_by_id() {
    let (actor, client) = ResourceActor::<Locker>::new(10);
    tokio::spawn(actor.run(()));

    for (tag, capacity) in [("C", 5), ("A", 1), ("B", 5)] {
        client.create(locker(tag, capacity)).await.unwrap();
    }

    let big: Vec<String> = client
        .list(|l: &Locker| l.capacity > 1)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.tag)
        .collect();
    assert_eq!(big, vec!["C", "B"]);
}

#[tokio::test]
async fn subscription_sees_snapshot_then_changes() {
    let (actor, client) = ResourceActor::<Locker>::new(10);
    tokio::spawn(actor.run(()));

    let id = client.create(locker("A1", 2)).await.unwrap();
    let mut subscription = client.subscribe().await.unwrap();
    assert_eq!(subscription.snapshot().len(), 1);
    assert_eq!(client.watcher_count(), 1);

    // Read-only and failed actions are not broadcast.
    client.perform_action(id, LockerAction::Peek).await.unwrap();
    let _ = client.perform_action(id, LockerAction::Fill(5)).await;
    client.perform_action(id, LockerAction::Fill(1)).await.unwrap();
    client.delete(id).await.unwrap();

    match subscription.next().await {
        Some(Change::Upserted(l)) => assert_eq!(l.used, 1),
        other => panic!("unexpected change: {other:?}"),
    }
    assert!(matches!(subscription.next().await, Some(Change::Deleted(1))));

    drop(subscription);
    assert_eq!(client.watcher_count(), 0);
}

#[tokio::test]
async fn actor_stops_when_clients_are_dropped() {
    let (actor, client) = ResourceActor::<Locker>::new(10);
    let handle = tokio::spawn(actor.run(()));

    let mut subscription = client.subscribe().await.unwrap();
    drop(client);

    handle.await.unwrap();
    assert!(subscription.next().await.is_none());
}
