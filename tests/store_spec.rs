use chrono::NaiveDate;
use okr_tracker::db::Database;
use okr_tracker::models::*;
use okr_tracker::Error;
use speculate2::speculate;
use uuid::Uuid;

fn project(title: &str) -> Project {
    Project::new(CreateProjectInput {
        title: title.to_string(),
        description: None,
    })
}

fn initiative(project_id: Uuid, title: &str) -> Initiative {
    Initiative::new(
        project_id,
        CreateInitiativeInput {
            title: title.to_string(),
            description: Some("Strategic bet".to_string()),
        },
    )
}

fn lee() -> Actor {
    Actor::new("lee@example.com")
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
    }

    describe "unit_of_work" {
        it "stamps created and updated fields with the actor" {
            let saved = db.unit_of_work(&lee(), |store| {
                let mut p = project("Roadmap");
                store.save(&mut p)?;
                store.get::<Project>(p.id)
            }).expect("Failed to save");

            assert_eq!(saved.audit.created_by.as_deref(), Some("lee@example.com"));
            assert_eq!(saved.audit.updated_by.as_deref(), Some("lee@example.com"));
            assert!(saved.audit.created_at.is_some());
            assert!(saved.audit.closed_at.is_none());
            assert!(saved.is_active());
        }

        it "keeps the creation stamp when another actor saves" {
            let id = db.unit_of_work(&lee(), |store| {
                let mut p = project("Roadmap");
                store.save(&mut p)?;
                Ok(p.id)
            }).expect("Failed to save");

            let updated = db.unit_of_work(&Actor::new("kim@example.com"), |store| {
                let mut p: Project = store.get(id)?;
                p.title = "Roadmap 2025".to_string();
                store.save(&mut p)?;
                store.get::<Project>(id)
            }).expect("Failed to update");

            assert_eq!(updated.title, "Roadmap 2025");
            assert_eq!(updated.audit.created_by.as_deref(), Some("lee@example.com"));
            assert_eq!(updated.audit.updated_by.as_deref(), Some("kim@example.com"));
        }

        it "rolls back every write when the work fails" {
            let p = project("Doomed");
            let id = p.id;
            let result: okr_tracker::Result<()> = db.unit_of_work(&lee(), move |store| {
                let mut p = p;
                store.save(&mut p)?;
                Err(Error::Validation("abort".to_string()))
            });
            assert!(result.is_err());

            let found = db.read(|store| store.load::<Project>(id)).expect("Query failed");
            assert!(found.is_none());
        }

        it "rejects a child whose parent row does not exist" {
            let result = db.unit_of_work(&lee(), |store| {
                let mut orphan = initiative(Uuid::new_v4(), "Orphan");
                store.save(&mut orphan)
            });
            assert!(matches!(result, Err(Error::Database(_))));
        }
    }

    describe "reads" {
        it "returns NotFound naming the kind" {
            let id = Uuid::new_v4();
            let result = db.read(|store| store.get::<Goal>(id));
            match result {
                Err(Error::NotFound { kind, id: missing }) => {
                    assert_eq!(kind, NodeKind::Goal);
                    assert_eq!(missing, id);
                }
                other => panic!("expected NotFound, got {:?}", other.map(|g| g.id)),
            }
        }

        it "returns children in insertion order" {
            let (project_id, titles) = db.unit_of_work(&lee(), |store| {
                let mut p = project("Roadmap");
                store.save(&mut p)?;
                let mut titles = Vec::new();
                for title in ["Zebra", "Alpha", "Mango"] {
                    let mut i = initiative(p.id, title);
                    store.save(&mut i)?;
                    titles.push(title.to_string());
                }
                Ok((p.id, titles))
            }).expect("Failed to save");

            let children = db.read(|store| store.children::<Initiative>(project_id)).expect("Query failed");
            let found: Vec<String> = children.into_iter().map(|i| i.title).collect();
            assert_eq!(found, titles);
        }

        it "separates active and inactive rows" {
            db.unit_of_work(&lee(), |store| {
                let mut open = project("Open");
                let mut closed = project("Closed");
                closed.soft_delete(store.actor(), chrono::Utc::now());
                store.save(&mut open)?;
                store.save(&mut closed)
            }).expect("Failed to save");

            let (active, inactive) = db.read(|store| {
                Ok((store.active::<Project>()?, store.inactive_nodes()?))
            }).expect("Query failed");

            assert_eq!(active.len(), 1);
            assert_eq!(active[0].title, "Open");
            assert_eq!(inactive.len(), 1);
            assert_eq!(inactive[0].title(), "Closed");
            assert_eq!(inactive[0].audit().closed_by.as_deref(), Some("lee@example.com"));
        }

        it "walks children by parent kind" {
            let (goal_id, objective_id) = db.unit_of_work(&lee(), |store| {
                let mut p = project("Roadmap");
                store.save(&mut p)?;
                let mut i = initiative(p.id, "Expand");
                store.save(&mut i)?;
                let mut g = Goal::new(i.id, CreateGoalInput { title: "Germany".to_string(), description: None });
                store.save(&mut g)?;
                let mut o = Objective::new(g.id, CreateObjectiveInput {
                    title: "Ship v2".to_string(),
                    description: None,
                    assignee: None,
                    year: Some(2025),
                    quarter: Some("Q3".to_string()),
                    due_date: NaiveDate::from_ymd_opt(2025, 9, 30),
                });
                store.save(&mut o)?;
                Ok((g.id, o.id))
            }).expect("Failed to save");

            let children = db.read(|store| store.children_of(NodeKind::Goal, goal_id)).expect("Query failed");
            assert_eq!(children.len(), 1);
            match &children[0] {
                Node::Objective(o) => {
                    assert_eq!(o.id, objective_id);
                    assert_eq!(o.due_date, NaiveDate::from_ymd_opt(2025, 9, 30));
                    assert_eq!(o.quarter.as_deref(), Some("Q3"));
                }
                other => panic!("expected objective, got {:?}", other.kind()),
            }

            let leaves = db.read(|store| store.children_of(NodeKind::ActionItem, Uuid::new_v4())).expect("Query failed");
            assert!(leaves.is_empty());
        }

        it "round-trips key result metrics and the lock flag" {
            let id = db.unit_of_work(&lee(), |store| {
                let mut p = project("Roadmap");
                store.save(&mut p)?;
                let mut i = initiative(p.id, "Expand");
                store.save(&mut i)?;
                let mut g = Goal::new(i.id, CreateGoalInput { title: "Germany".to_string(), description: None });
                store.save(&mut g)?;
                let mut o = Objective::new(g.id, CreateObjectiveInput {
                    title: "Ship v2".to_string(),
                    description: None,
                    assignee: None,
                    year: None,
                    quarter: None,
                    due_date: None,
                });
                store.save(&mut o)?;
                let mut kr = KeyResult::new(o.id, CreateKeyResultInput {
                    title: "Revenue".to_string(),
                    unit: Some("kEUR".to_string()),
                    metric_start: Some(1.5),
                    metric_target: Some(12.0),
                    ..Default::default()
                });
                kr.manual_progress_set = true;
                store.save(&mut kr)?;
                Ok(kr.id)
            }).expect("Failed to save");

            let kr = db.read(|store| store.get::<KeyResult>(id)).expect("Query failed");
            assert_eq!(kr.metric_start, Some(1.5));
            assert_eq!(kr.metric_target, Some(12.0));
            assert_eq!(kr.metric_current, None);
            assert_eq!(kr.unit.as_deref(), Some("kEUR"));
            assert!(kr.manual_progress_set);
        }
    }

    describe "open" {
        it "creates the database file and persists across reopen" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("nested").join("okr.db");

            let id = {
                let db = Database::open(path.clone()).expect("Failed to open database");
                db.migrate().expect("Failed to migrate");
                db.unit_of_work(&lee(), |store| {
                    let mut p = project("Persistent");
                    store.save(&mut p)?;
                    Ok(p.id)
                }).expect("Failed to save")
            };
            assert!(path.exists());

            let reopened = Database::open(path).expect("Failed to reopen database");
            reopened.migrate().expect("Failed to migrate again");
            let p = reopened.read(|store| store.get::<Project>(id)).expect("Query failed");
            assert_eq!(p.title, "Persistent");
        }
    }
}
