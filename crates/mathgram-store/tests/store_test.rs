use mathgram_store::{MemoryStore, Registration, Store, StoreError, authenticate, register};

const COST: u32 = 4;

fn registered_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    for (email, name) in [("ana@example.com", Some("Ana")), ("bob@example.com", None)] {
        let form = Registration {
            email,
            name,
            password: "segredo1",
            confirm_password: "segredo1",
        };
        register(&mut store, &form, COST).unwrap();
    }
    store
}

#[test]
fn toggle_like_twice_restores_state() {
    let mut store = registered_store();
    let ana = authenticate(&store, "ana@example.com", "segredo1").unwrap();
    let bob = authenticate(&store, "bob@example.com", "segredo1").unwrap();

    let post = ana.create_post(&mut store, "Euler", r"$e^{i\pi}+1=0$").unwrap();
    ana.toggle_like(&mut store, post).unwrap();

    let liked_before = bob.has_liked(&store, post);
    let count_before = store.list_posts()[0].likes;

    bob.toggle_like(&mut store, post).unwrap();
    assert_eq!(store.list_posts()[0].likes, count_before + 1);
    bob.toggle_like(&mut store, post).unwrap();

    assert_eq!(bob.has_liked(&store, post), liked_before);
    assert_eq!(store.list_posts()[0].likes, count_before);
}

#[test]
fn likes_are_per_user() {
    let mut store = registered_store();
    let ana = authenticate(&store, "ana@example.com", "segredo1").unwrap();
    let bob = authenticate(&store, "bob@example.com", "segredo1").unwrap();
    let post = ana.create_post(&mut store, "T", "C").unwrap();

    ana.toggle_like(&mut store, post).unwrap();
    bob.toggle_like(&mut store, post).unwrap();
    assert_eq!(store.list_posts()[0].likes, 2);
    assert!(ana.has_liked(&store, post));
    assert!(bob.has_liked(&store, post));
}

#[test]
fn snapshot_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mathgram.json");

    let mut store = registered_store();
    let ana = authenticate(&store, "ana@example.com", "segredo1").unwrap();
    let post = ana
        .create_post(&mut store, "O Teorema <de> Pitágoras", "$a^2+b^2=c^2$")
        .unwrap();
    ana.create_comment(&mut store, post, "Ótimo & claro").unwrap();
    store.save(&path).unwrap();

    let reloaded = MemoryStore::load(&path).unwrap();
    assert_eq!(reloaded, store);
    let posts = reloaded.list_posts();
    assert_eq!(posts[0].title, "O Teorema <de> Pitágoras");
    assert_eq!(reloaded.list_comments(post)[0].content, "Ótimo & claro");
    // Logging in still works against the reloaded hashes.
    authenticate(&reloaded, "bob@example.com", "segredo1").unwrap();
}

#[test]
fn missing_snapshot_is_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryStore::load(&dir.path().join("absent.json")).unwrap();
    assert!(store.list_posts().is_empty());
}

#[test]
fn corrupt_snapshot_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    let err = MemoryStore::load(&path).unwrap_err();
    assert!(matches!(err, StoreError::Json(_)));
    assert!(!err.is_validation());
}

#[test]
fn display_names_in_views() {
    let mut store = registered_store();
    let bob = authenticate(&store, "bob@example.com", "segredo1").unwrap();
    let post = bob.create_post(&mut store, "T", "C").unwrap();
    bob.create_comment(&mut store, post, "oi").unwrap();
    assert_eq!(store.list_posts()[0].author_name, "bob");
    assert_eq!(store.list_comments(post)[0].author_name, "bob");
}
