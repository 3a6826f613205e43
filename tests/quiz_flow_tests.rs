mod common;

use common::{FakeGateway, single_question, text_question};
use rand::SeedableRng;
use rand::rngs::StdRng;
use reqwest::StatusCode;
use school_quiz::{Level1Choice, NoticeKind, QuestionKind, QuizController, Response};

fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

fn physics_bank() -> Vec<school_quiz::Question> {
    vec![
        text_question(1, "Physics > Midterm > Set1", &["force"]),
        text_question(2, "Physics > Final > Set2", &["mass"]),
        text_question(3, "Physics > Midterm2", &["energy"]),
        text_question(4, "Math", &["4"]),
        text_question(5, "", &["none"]),
    ]
}

#[tokio::test]
async fn test_scope_selects_only_the_matching_folder() {
    let gateway = FakeGateway::with_questions(physics_bank());
    let mut controller = QuizController::new(gateway.clone());

    controller.load_categories().await.unwrap();
    assert_eq!(
        controller.selector().tree().level1_options(),
        vec!["Math", "Physics"]
    );
    assert!(controller.selector().tree().has_unclassified());

    controller
        .selector_mut()
        .select_level1(Level1Choice::Folder("Physics".into()))
        .unwrap();
    assert_eq!(controller.selector().level2_options(), vec!["Final", "Midterm", "Midterm2"]);
    controller
        .selector_mut()
        .select_level2(Some("Midterm".into()))
        .unwrap();
    assert_eq!(controller.selector().label(), "Physics > Midterm");

    controller.start_quiz(&mut rng()).await.unwrap();
    let ids: Vec<i64> = controller
        .runner()
        .session()
        .unwrap()
        .questions()
        .iter()
        .map(|q| q.id)
        .collect();
    assert_eq!(ids, vec![1]);
    assert!(gateway.calls().contains(&"list_questions:".to_string()));
}

#[tokio::test]
async fn test_all_and_unclassified_scopes() {
    let gateway = FakeGateway::with_questions(physics_bank());
    let mut controller = QuizController::new(gateway);
    controller.load_categories().await.unwrap();

    controller.start_quiz(&mut rng()).await.unwrap();
    assert_eq!(controller.runner().session().unwrap().total(), 4);

    controller
        .selector_mut()
        .select_level1(Level1Choice::Unclassified)
        .unwrap();
    controller.start_quiz(&mut rng()).await.unwrap();
    let session = controller.runner().session().unwrap();
    assert_eq!(session.total(), 1);
    assert_eq!(session.questions()[0].id, 5);
}

#[tokio::test]
async fn test_text_answer_is_normalized() {
    let gateway = FakeGateway::with_questions(vec![text_question(1, "Geo", &["paris", "London"])]);
    let mut controller = QuizController::new(gateway);
    controller.load_categories().await.unwrap();
    controller.start_quiz(&mut rng()).await.unwrap();

    let outcome = controller.submit(&Response::Text(" Paris ".into())).unwrap();
    assert!(outcome.correct);
    let summary = controller.summary().unwrap();
    assert_eq!(summary.score, 1);
    assert!(summary.all_correct());
}

#[tokio::test]
async fn test_three_questions_one_wrong() {
    let gateway = FakeGateway::with_questions(vec![
        text_question(1, "Math", &["1"]),
        text_question(2, "Math", &["2"]),
        text_question(3, "Math", &["3"]),
    ]);
    let mut controller = QuizController::new(gateway);
    controller.load_categories().await.unwrap();
    controller.start_quiz(&mut rng()).await.unwrap();

    for _ in 0..3 {
        let question = controller.current_question().unwrap().clone();
        let answer = if question.id == 2 { "wrong".to_string() } else { question.id.to_string() };
        controller.submit(&Response::Text(answer)).unwrap();
    }

    assert!(controller.runner().is_finished());
    let summary = controller.summary().unwrap();
    assert_eq!(summary.score, 2);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.wrong_list.len(), 1);
    assert_eq!(summary.wrong_list[0].question_text, "Question 2");
    assert_eq!(summary.wrong_list[0].your_answer, "wrong");
    assert_eq!(summary.wrong_list[0].correct_answer, "2");
}

#[tokio::test]
async fn test_shuffled_single_choice_keeps_correct_content() {
    let gateway = FakeGateway::with_questions(vec![single_question(
        1,
        "Chem",
        &["H2O", "CO2", "NaCl", "O2"],
        2,
    )]);
    let mut controller = QuizController::new(gateway);
    controller.load_categories().await.unwrap();
    controller.start_quiz(&mut rng()).await.unwrap();

    let question = controller.current_question().unwrap().clone();
    let QuestionKind::Single { choices, answer } = &question.kind else {
        panic!("expected a single-choice question");
    };
    let mut sorted = choices.clone();
    sorted.sort();
    assert_eq!(sorted, vec!["CO2", "H2O", "NaCl", "O2"]);
    let answer = answer.unwrap();
    assert_eq!(choices[answer], "NaCl");

    assert!(!controller.can_submit(&Response::Single(4)));
    let outcome = controller.submit(&Response::Single(answer)).unwrap();
    assert!(outcome.correct);
    assert_eq!(outcome.correct_answer, "NaCl");
}

#[tokio::test]
async fn test_fetch_failure_leaves_runner_idle() {
    let gateway = FakeGateway::with_questions(physics_bank());
    let mut controller = QuizController::new(gateway.clone());
    controller.load_categories().await.unwrap();

    gateway.set_failure(Some(StatusCode::INTERNAL_SERVER_ERROR));
    let notice = controller.start_quiz(&mut rng()).await.unwrap_err();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert!(controller.runner().is_idle());

    let notice = controller.load_categories().await.unwrap_err();
    assert_eq!(notice.message, "Failed to load categories");
}

#[tokio::test]
async fn test_empty_folder_is_reported() {
    let gateway = FakeGateway::with_questions(vec![text_question(1, "Math", &["1"])]);
    let mut controller = QuizController::new(gateway.clone());
    controller.load_categories().await.unwrap();
    controller
        .selector_mut()
        .select_level1(Level1Choice::Folder("Math".into()))
        .unwrap();

    // The question disappears between loading categories and starting
    gateway.state.lock().unwrap().questions.clear();
    let notice = controller.start_quiz(&mut rng()).await.unwrap_err();
    assert_eq!(notice.message, "No questions in the selected folder");
    assert!(controller.runner().is_idle());
}

#[tokio::test]
async fn test_retry_and_return_to_title() {
    let gateway = FakeGateway::with_questions(vec![
        text_question(1, "Math", &["1"]),
        text_question(2, "Math", &["2"]),
    ]);
    let mut controller = QuizController::new(gateway.clone());
    controller.load_categories().await.unwrap();
    controller.start_quiz(&mut rng()).await.unwrap();
    assert!(controller.retry().is_err());

    controller.submit(&Response::Text("x".into())).unwrap();
    controller.submit(&Response::Text("y".into())).unwrap();
    assert_eq!(controller.summary().unwrap().score, 0);

    gateway.clear_calls();
    controller.retry().unwrap();
    assert!(gateway.calls().is_empty());
    assert!(controller.runner().is_running());
    assert!(controller.summary().is_none());

    controller.return_to_title();
    assert!(controller.runner().is_idle());
    assert!(controller.current_question().is_none());
}
