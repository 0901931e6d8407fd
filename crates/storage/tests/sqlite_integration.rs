use chrono::{NaiveDate, NaiveTime};
use study_core::model::{
    NewStudySession, NewStudyTimeRecord, NewSubject, NewTask, NewUser, Priority, StudySession,
    StudySessionPatch, StudyTimeRecord, Subject, SubjectId, SubjectPatch, Task, TaskId,
    TaskPatch, UserId,
};
use storage::repository::{
    RecordRepository, Storage, StorageError, TimeRecordRepository, UserRepository,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn new_task(user: u64, title: &str) -> NewTask {
    NewTask {
        user_id: UserId::new(user),
        subject_id: SubjectId::new(1),
        title: title.into(),
        description: Some("chapters 1-3".into()),
        priority: Priority::High,
        due_date: date(15),
        estimated_time: Some(60),
        completed: false,
    }
}

#[tokio::test]
async fn sqlite_task_crud_round_trip() {
    let repo = connect("memdb_tasks").await;

    let first = RecordRepository::<Task>::create(&repo, new_task(1, "Essay"))
        .await
        .unwrap();
    let second = RecordRepository::<Task>::create(&repo, new_task(2, "Quiz"))
        .await
        .unwrap();
    assert_eq!(first.id, TaskId::new(1));
    assert_eq!(second.id, TaskId::new(2));

    let mine = RecordRepository::<Task>::list_for_user(&repo, UserId::new(1))
        .await
        .unwrap();
    assert_eq!(mine, vec![first.clone()]);

    let updated = RecordRepository::<Task>::update(&repo, first.id, TaskPatch::completed(true))
        .await
        .unwrap()
        .unwrap();
    assert!(updated.completed);
    assert_eq!(updated.description.as_deref(), Some("chapters 1-3"));

    let fetched = RecordRepository::<Task>::get(&repo, first.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched, updated);

    assert!(RecordRepository::<Task>::delete(&repo, first.id).await.unwrap());
    assert!(!RecordRepository::<Task>::delete(&repo, first.id).await.unwrap());
    assert!(
        RecordRepository::<Task>::update(&repo, first.id, TaskPatch::default())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn sqlite_patch_can_clear_optional_fields() {
    let repo = connect("memdb_subjects").await;
    let subject = RecordRepository::<Subject>::create(
        &repo,
        NewSubject {
            user_id: UserId::new(1),
            name: "Physics".into(),
            color: "purple".into(),
            description: Some("Mechanics".into()),
        },
    )
    .await
    .unwrap();

    let patch = SubjectPatch {
        description: Some(None),
        color: Some("red".into()),
        ..SubjectPatch::default()
    };
    let updated = RecordRepository::<Subject>::update(&repo, subject.id, patch)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "Physics");
    assert_eq!(updated.color, "red");
    assert_eq!(updated.description, None);
}

#[tokio::test]
async fn sqlite_study_session_times_survive_storage() {
    let repo = connect("memdb_sessions").await;
    let session = RecordRepository::<StudySession>::create(
        &repo,
        NewStudySession {
            user_id: UserId::new(1),
            subject_id: SubjectId::new(2),
            title: "Group review".into(),
            description: None,
            location: Some("Library".into()),
            start_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
            date: date(5),
            completed: false,
            participants: Some(4),
        },
    )
    .await
    .unwrap();

    let patch = StudySessionPatch {
        participants: Some(None),
        ..StudySessionPatch::default()
    };
    let updated = RecordRepository::<StudySession>::update(&repo, session.id, patch)
        .await
        .unwrap()
        .unwrap();
    let stored = RecordRepository::<StudySession>::get(&repo, session.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, updated);
    assert_eq!(stored.duration_label(), "1h 30m");
    assert_eq!(stored.participants, None);
}

#[tokio::test]
async fn sqlite_time_records_filter_by_date_range() {
    let repo = connect("memdb_records").await;
    for (user, day, minutes) in [(1, 1, 30), (1, 4, 45), (1, 8, 20), (2, 4, 60)] {
        let draft = NewStudyTimeRecord {
            user_id: UserId::new(user),
            subject_id: SubjectId::new(1),
            task_id: Some(TaskId::new(3)),
            date: date(day),
            duration: minutes,
            focus_score: Some(80),
        };
        RecordRepository::<StudyTimeRecord>::create(&repo, draft)
            .await
            .unwrap();
    }

    let week = repo
        .list_in_range(UserId::new(1), date(1), date(4))
        .await
        .unwrap();
    let minutes: Vec<u32> = week.iter().map(|r| r.duration).collect();
    assert_eq!(minutes, vec![30, 45]);
    assert_eq!(week[0].task_id, Some(TaskId::new(3)));
}

#[tokio::test]
async fn sqlite_rejects_duplicate_usernames() {
    let repo = connect("memdb_users").await;
    let user = NewUser {
        username: "ada".into(),
        password: "pw".into(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: "ada@example.com".into(),
    };
    let created = repo.create_user(user.clone()).await.unwrap();
    assert_eq!(created.id, UserId::new(1));

    let err = repo.create_user(user).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict));

    let found = repo.find_by_username("ada").await.unwrap().unwrap();
    assert_eq!(found, created);
}

#[tokio::test]
async fn storage_sqlite_wires_every_repository() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    let subject = storage
        .subjects
        .create(NewSubject {
            user_id: UserId::new(1),
            name: "Biology".into(),
            color: "green".into(),
            description: None,
        })
        .await
        .unwrap();
    let listed = storage.subjects.list_for_user(UserId::new(1)).await.unwrap();
    assert_eq!(listed, vec![subject]);
    assert!(storage.users.get_user(UserId::new(1)).await.unwrap().is_none());
}
