use anyhow::Result;

use super::LessonTree;
use super::LoginResult;
use super::Order;

fn tree() -> Result<LessonTree> {
    let tree = serde_json::from_str(
        r#"{
            "course_id": "course-1",
            "course_name": "Prompting 101",
            "lessons": [
                {
                    "lesson_id": "1",
                    "lesson_name": "Basics",
                    "status": "completed",
                    "children": [
                        { "lesson_id": "1.1", "lesson_name": "Hello", "status": "completed" }
                    ]
                },
                {
                    "lesson_id": "2",
                    "lesson_name": "Roles",
                    "status": "learning",
                    "children": [
                        { "lesson_id": "2.1", "lesson_name": "System", "status": "completed" },
                        { "lesson_id": "2.2", "lesson_name": "User", "status": "learning" },
                        { "lesson_id": "2.3", "lesson_name": "Tools", "status": "locked" }
                    ]
                }
            ]
        }"#,
    )?;
    return Ok(tree);
}

#[test]
fn it_finds_the_first_open_lesson() -> Result<()> {
    let tree = tree()?;
    let lesson = tree.first_open_lesson().unwrap();
    assert_eq!(lesson.lesson_id, "2.2");
    return Ok(());
}

#[test]
fn it_falls_back_to_the_first_leaf_lesson() -> Result<()> {
    let mut tree = tree()?;
    tree.lessons.remove(1);
    let lesson = tree.first_open_lesson().unwrap();
    assert_eq!(lesson.lesson_id, "1.1");
    return Ok(());
}

#[test]
fn it_has_no_lesson_in_an_empty_course() {
    assert!(LessonTree::default().first_open_lesson().is_none());
}

#[test]
fn it_reads_the_login_user_info() -> Result<()> {
    let res: LoginResult = serde_json::from_str(
        r#"{"token":"abc","userInfo":{"user_id":"user-1","name":"Ada","mobile":"13800000000"}}"#,
    )?;
    assert_eq!(res.token, "abc");
    assert_eq!(res.user_info.name, "Ada");
    return Ok(());
}

#[test]
fn it_knows_when_an_order_is_paid() {
    let mut order = Order {
        order_id: "order-1".to_string(),
        status: 501,
        ..Order::default()
    };
    assert!(!order.is_paid());

    order.status = Order::STATUS_PAID;
    assert!(order.is_paid());
}
