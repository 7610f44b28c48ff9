use std::io;
use std::io::Write;

use anyhow::bail;
use anyhow::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;
use dialoguer::Input;
use dialoguer::Select;
use tokio::sync::mpsc;
use tokio::task;
use yansi::Paint;

use crate::configuration::ClientSettings;
use crate::domain::models::Action;
use crate::domain::models::AffordanceValue;
use crate::domain::models::ApiError;
use crate::domain::models::Event;
use crate::domain::models::InputAffordance;
use crate::domain::models::LearnerApiBox;
use crate::domain::models::LessonNode;
use crate::domain::models::LessonTree;
use crate::domain::models::Message;
use crate::domain::models::Order;
use crate::domain::models::OutboundPayload;
use crate::domain::models::ProgressChange;
use crate::domain::models::PurchaseOutcome;
use crate::domain::models::Role;
use crate::domain::models::RunRequest;
use crate::domain::models::SessionProgress;
use crate::domain::models::StreamStatus;
use crate::domain::services::actions::ActionsService;
use crate::domain::services::ChatState;
use crate::domain::services::ChatUpdate;
use crate::domain::services::Credentials;
use crate::domain::services::retry_after_login;
use crate::domain::services::InteractionDispatcher;
use crate::domain::services::ProgressStore;
use crate::domain::services::SavedLogin;
use crate::domain::services::UserStore;
use crate::infrastructure::api::ApiManager;
use crate::infrastructure::stream::StreamConnector;

fn toast(text: &str) {
    println!("{}", Paint::yellow(format!("! {text}")));
}

fn print_message(message: &Message) {
    if message.is_separator() {
        println!(
            "\n{}\n",
            Paint::cyan(format!("── {} ──", message.content)).bold()
        );
        return;
    }

    match message.role {
        Role::User => println!("{}", Paint::green(format!("> {}", message.content))),
        Role::Assistant => println!("{}", message.content),
        Role::System => println!("{}", Paint::new(&message.content).dimmed()),
    }
}

async fn prompt_select(prompt: String, items: Vec<String>) -> Result<Option<usize>> {
    return task::spawn_blocking(move || -> Result<Option<usize>> {
        let idx = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(&items)
            .default(0)
            .interact_opt()?;
        return Ok(idx);
    })
    .await?;
}

async fn prompt_input(prompt: String) -> Result<String> {
    return task::spawn_blocking(move || -> Result<String> {
        let text = Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        return Ok(text);
    })
    .await?;
}

async fn prompt_confirm(prompt: String) -> Result<bool> {
    return task::spawn_blocking(move || -> Result<bool> {
        let res = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(true)
            .interact()?;
        return Ok(res);
    })
    .await?;
}

fn placeholder_or(placeholder: &str, fallback: &str) -> String {
    if placeholder.is_empty() {
        return fallback.to_string();
    }
    return placeholder.to_string();
}

enum Answer {
    Value(AffordanceValue),
    RestartChapter,
    Quit,
}

enum Turn {
    Send(OutboundPayload),
    RestartChapter,
    Quit,
}

/// Everything the subcommands share: who the learner is and how to reach
/// the backend.
struct Services {
    settings: ClientSettings,
    credentials: Credentials,
    user: UserStore,
    api: LearnerApiBox,
}

impl Services {
    async fn load(settings: ClientSettings) -> Result<Services> {
        let credentials = Credentials::default();
        let user = UserStore::default();

        if !settings.token.is_empty() {
            user.init(&settings.token);
        } else if let Some(saved) = credentials.load().await? {
            user.init(&saved.token);
            if let Some(profile) = saved.profile {
                user.set_profile(profile);
            }
        }

        let api = ApiManager::get(&settings, user.clone());
        return Ok(Services {
            settings,
            credentials,
            user,
            api,
        });
    }

    fn course_id(&self) -> Result<String> {
        if self.settings.course_id.is_empty() {
            bail!("A course ID is required, set it with --course-id or SHIFU_COURSE_ID");
        }
        return Ok(self.settings.course_id.to_string());
    }

    async fn login(&self) -> Result<()> {
        let mobile = loop {
            let mobile = prompt_input("Phone number".to_string()).await?;
            let mobile = mobile.trim().to_string();
            if mobile.is_empty() {
                toast("Please enter a phone number.");
                continue;
            }
            break mobile;
        };

        self.api.send_sms_code(&mobile).await?;
        println!("An SMS code was sent to {mobile}.");

        let res = loop {
            let code = prompt_input("SMS code".to_string()).await?;
            match self.api.verify_sms_code(&mobile, code.trim()).await {
                Ok(res) => break res,
                Err(err) => {
                    if let Some(ApiError::Server { message, .. }) = err.downcast_ref::<ApiError>() {
                        toast(message);
                        continue;
                    }
                    return Err(err);
                }
            }
        };

        self.user.login(&res.token, res.user_info.clone());
        self.credentials
            .save(&SavedLogin {
                token: res.token,
                profile: Some(res.user_info.clone()),
            })
            .await?;

        let name = if res.user_info.name.is_empty() {
            mobile
        } else {
            res.user_info.name
        };
        println!("{}", Paint::green(format!("Logged in as {name}.")));
        return Ok(());
    }

    async fn forget_login(&self) -> Result<()> {
        self.user.logout();
        self.credentials.clear().await?;
        return Ok(());
    }

    async fn relogin(&self) -> Result<()> {
        self.forget_login().await?;
        toast("Your session expired, please log in again.");
        return self.login().await;
    }

    async fn lesson_tree(&self) -> Result<LessonTree> {
        let course_id = self.course_id()?;
        let course_id = course_id.as_str();
        let api = &self.api;
        return retry_after_login(
            move || return api.lesson_tree(course_id),
            move || return self.relogin(),
        )
        .await;
    }

    async fn init_order(&self) -> Result<Order> {
        let course_id = self.course_id()?;
        let course_id = course_id.as_str();
        let api = &self.api;
        return retry_after_login(
            move || return api.init_order(course_id),
            move || return self.relogin(),
        )
        .await;
    }

    async fn query_order(&self, order_id: &str) -> Result<Order> {
        let api = &self.api;
        return retry_after_login(
            move || return api.query_order(order_id),
            move || return self.relogin(),
        )
        .await;
    }

    async fn purchase(
        &self,
        progress: &ProgressStore,
        order_id: Option<String>,
        dismissable: bool,
    ) -> Result<PurchaseOutcome> {
        let mut order = match order_id {
            Some(order_id) => self.query_order(&order_id).await?,
            None => self.init_order().await?,
        };

        loop {
            if order.is_paid() {
                progress.set_purchased(true);
                return Ok(PurchaseOutcome::Paid(order.order_id));
            }

            println!(
                "This lesson has to be purchased ({}). Pay at: {}",
                order.price, order.pay_url
            );

            let mut items = vec!["I have paid".to_string()];
            if dismissable {
                items.push("Not now".to_string());
            }
            let choice = prompt_select("Purchase".to_string(), items).await?;
            if choice != Some(0) {
                return Ok(PurchaseOutcome::Dismissed);
            }

            let order_id = order.order_id.to_string();
            order = self.query_order(&order_id).await?;
            if !order.is_paid() {
                toast("The payment has not arrived yet.");
            }
        }
    }

    /// Asks the learner for an answer.
    async fn answer(
        &self,
        affordance: &InputAffordance,
        progress: &ProgressStore,
    ) -> Result<Answer> {
        match affordance {
            InputAffordance::NextButton { label } => {
                let can_restart = !progress.snapshot().chapter_id.is_empty();
                let mut items = vec![label.to_string()];
                if can_restart {
                    items.push("Restart chapter".to_string());
                }
                items.push("Quit".to_string());

                match prompt_select("".to_string(), items).await? {
                    Some(0) => return Ok(Answer::Value(AffordanceValue::Next)),
                    Some(1) if can_restart => return Ok(Answer::RestartChapter),
                    _ => return Ok(Answer::Quit),
                }
            }
            InputAffordance::ButtonGroup { options } => {
                let items = options
                    .iter()
                    .map(|e| return e.label.to_string())
                    .collect::<Vec<String>>();
                match prompt_select("Choose one".to_string(), items).await? {
                    Some(idx) => {
                        let value = options[idx].value.to_string();
                        return Ok(Answer::Value(AffordanceValue::Selected(value)));
                    }
                    None => return Ok(Answer::Quit),
                }
            }
            InputAffordance::TextBox { placeholder, ask } => {
                let fallback = if *ask { "Ask a question" } else { "Your answer" };
                let text = prompt_input(placeholder_or(placeholder, fallback)).await?;
                return Ok(Answer::Value(AffordanceValue::Text(text)));
            }
            InputAffordance::PhoneField { placeholder } => {
                let text = prompt_input(placeholder_or(placeholder, "Phone number")).await?;
                return Ok(Answer::Value(AffordanceValue::Phone(text)));
            }
            InputAffordance::CodeField { placeholder } => {
                let text =
                    prompt_input(placeholder_or(placeholder, "Verification code")).await?;
                return Ok(Answer::Value(AffordanceValue::Code(text)));
            }
            InputAffordance::PurchaseModal {
                order_id,
                dismissable,
            } => {
                let outcome = self
                    .purchase(progress, order_id.clone(), *dismissable)
                    .await?;
                return Ok(Answer::Value(AffordanceValue::Purchase(outcome)));
            }
            InputAffordance::LoginGate { label } => {
                println!("{label}");
                if !self.user.is_logged_in() {
                    self.login().await?;
                }
                return Ok(Answer::Value(AffordanceValue::LoggedIn));
            }
        }
    }
}

fn send_request(
    state: &mut ChatState,
    action_tx: &mpsc::UnboundedSender<Action>,
    request: RunRequest,
) -> Result<()> {
    state.begin_request(&request);
    action_tx.send(Action::StreamOpen(request))?;
    return Ok(());
}

fn print_update(update: ChatUpdate) -> Result<()> {
    match update {
        ChatUpdate::Delta(delta) => {
            print!("{delta}");
            io::stdout().flush()?;
        }
        ChatUpdate::Finalized(_) => {
            println!();
        }
        ChatUpdate::Separator(message) => {
            print_message(&message);
        }
        ChatUpdate::Interaction(_) | ChatUpdate::Progress | ChatUpdate::Ignored => {}
    }

    return Ok(());
}

fn print_progress(current: &SessionProgress, previous: &SessionProgress) {
    match current.change_from(previous) {
        ProgressChange::ChapterReset(chapter_id) => {
            println!(
                "\n{}\n",
                Paint::cyan(format!("── Chapter {chapter_id} restarted ──")).bold()
            );
        }
        ProgressChange::ChapterNavigated(chapter_id) => {
            tracing::debug!(chapter_id = chapter_id, "Moved to chapter");
        }
        ProgressChange::Other => {}
    }
}

/// Interactive lesson loop: stream a turn, prompt for the pending
/// interaction, send the answer, repeat.
pub async fn start(settings: ClientSettings) -> Result<()> {
    let services = Services::load(settings).await?;
    let course_id = services.course_id()?;

    if services.user.is_logged_in() {
        match services.api.user_info().await {
            Ok(profile) => services.user.set_profile(profile),
            Err(err) => tracing::warn!(error = ?err, "Failed to refresh user profile"),
        }
    }
    if let Some(profile) = services.user.profile() {
        if !profile.name.is_empty() {
            println!("Welcome back, {}.", profile.name);
        }
    }

    let mut lesson_id = services.settings.lesson_id.to_string();
    if lesson_id.is_empty() {
        let tree = services.lesson_tree().await?;
        match tree.first_open_lesson() {
            Some(lesson) => {
                println!("{}", Paint::new(&lesson.lesson_name).bold());
                lesson_id = lesson.lesson_id.to_string();
            }
            None => bail!(format!("Course {course_id} has no lessons")),
        }
    }

    let progress = ProgressStore::default();
    progress.init(&course_id, &lesson_id);

    let connector = StreamConnector::new(&services.settings, services.user.clone());
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let service_api = services.api.clone();
    let service_progress = progress.clone();
    let background = tokio::spawn(async move {
        return ActionsService::start(
            connector,
            service_api,
            service_progress,
            event_tx,
            &mut action_rx,
        )
        .await;
    });

    let mut state = ChatState::new(progress.clone(), services.settings.preview_mode);
    match services.api.study_record(&lesson_id).await {
        Ok(record) => state.restore(record),
        Err(err) => tracing::warn!(error = ?err, "Failed to load study record"),
    }
    for message in state.transcript.messages() {
        print_message(message);
    }

    let mut progress_rx = progress.subscribe();
    let mut last_progress = progress.snapshot();
    let mut resetting: Option<String> = None;

    let first_request = state.start_request();
    send_request(&mut state, &action_tx, first_request)?;

    loop {
        if state.waiting_for_stream || resetting.is_some() {
            let event = tokio::select! {
                event = event_rx.recv() => event,
                res = progress_rx.changed() => {
                    if res.is_ok() {
                        let current = progress_rx.borrow_and_update().clone();
                        print_progress(&current, &last_progress);
                        last_progress = current;
                    }
                    continue;
                }
            };
            let event = match event {
                Some(event) => event,
                None => break,
            };

            match event {
                Event::StreamMessage(frame) => {
                    print_update(state.handle_stream_frame(frame))?;
                }
                Event::StreamEnd(outcome) => {
                    if state.handle_stream_end(outcome).is_some() {
                        println!();
                    }
                    match outcome.status {
                        StreamStatus::TimedOut => toast("The lesson stopped responding."),
                        StreamStatus::Errored => toast("The connection to the lesson was lost."),
                        _ => {}
                    }
                }
                Event::StreamError(text) => {
                    toast(&text);
                }
                Event::Notice(text) => {
                    resetting = None;
                    toast(&text);
                }
                Event::ChapterReset(chapter_id) => {
                    resetting = None;
                    let request = state.handle_chapter_reset(&chapter_id);
                    send_request(&mut state, &action_tx, request)?;
                }
                Event::AuthRequired() => {
                    state.waiting_for_stream = false;
                    services.relogin().await?;
                    if let Some(chapter_id) = resetting.clone() {
                        action_tx.send(Action::ResetChapter(chapter_id))?;
                    } else if let Some(request) = state.resend_request() {
                        send_request(&mut state, &action_tx, request)?;
                    }
                }
            }
            continue;
        }

        if state.can_resend {
            if !prompt_confirm("Resend your last answer?".to_string()).await? {
                break;
            }
            if let Some(request) = state.resend_request() {
                send_request(&mut state, &action_tx, request)?;
                continue;
            }
            break;
        }

        let pending = match state.pending.clone() {
            Some(pending) => pending,
            None => {
                println!("{}", Paint::green("You reached the end of this lesson."));
                break;
            }
        };

        let affordance = InteractionDispatcher::render(&pending);
        let turn = loop {
            let value = match services.answer(&affordance, &progress).await? {
                Answer::Value(value) => value,
                Answer::RestartChapter => break Turn::RestartChapter,
                Answer::Quit => break Turn::Quit,
            };
            match InteractionDispatcher::submit(&affordance, value) {
                Ok(payload) => break Turn::Send(payload),
                Err(err) => toast(&err.to_string()),
            }
        };

        match turn {
            Turn::Send(payload) => {
                let request = state.next_request(payload);
                send_request(&mut state, &action_tx, request)?;
            }
            Turn::RestartChapter => {
                let chapter_id = progress.snapshot().chapter_id;
                resetting = Some(chapter_id.to_string());
                action_tx.send(Action::ResetChapter(chapter_id))?;
            }
            Turn::Quit => break,
        }
    }

    action_tx.send(Action::StreamAbort())?;
    drop(action_tx);
    background.await??;

    return Ok(());
}

fn format_lesson(lesson: &LessonNode, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    let mut line = format!("{indent}- ({}) {}", lesson.lesson_id, lesson.lesson_name);
    if !lesson.status.is_empty() {
        line = format!("{line} [{}]", lesson.status);
    }
    lines.push(line);

    for child in &lesson.children {
        format_lesson(child, depth + 1, lines);
    }
}

pub async fn lessons(settings: ClientSettings) -> Result<()> {
    let services = Services::load(settings).await?;
    let tree = services.lesson_tree().await?;

    if tree.lessons.is_empty() {
        println!("This course has no lessons yet.");
        return Ok(());
    }

    let mut lines = vec![];
    for lesson in &tree.lessons {
        format_lesson(lesson, 0, &mut lines);
    }

    if !tree.course_name.is_empty() {
        println!("{}", Paint::new(&tree.course_name).bold());
    }
    println!("{}", lines.join("\n"));
    return Ok(());
}

pub async fn reset_chapter(settings: ClientSettings, chapter_id: &str) -> Result<()> {
    let services = Services::load(settings).await?;
    let progress = ProgressStore::default();
    progress.init(
        &services.settings.course_id,
        &services.settings.lesson_id,
    );

    let api = services.api.as_ref();
    let progress = &progress;
    let services = &services;
    retry_after_login(
        move || return progress.reset_chapter(api, chapter_id),
        move || return services.relogin(),
    )
    .await?;
    println!("Chapter {chapter_id} was reset.");
    return Ok(());
}

pub async fn login(settings: ClientSettings) -> Result<()> {
    let services = Services::load(settings).await?;
    return services.login().await;
}

pub async fn feedback(settings: ClientSettings, text: &str) -> Result<()> {
    let services = Services::load(settings).await?;
    if text.trim().is_empty() {
        bail!("Feedback can not be empty");
    }

    let text = text.trim();
    let api = &services.api;
    let services = &services;
    retry_after_login(
        move || return api.submit_feedback(text),
        move || return services.relogin(),
    )
    .await?;
    println!("Thanks for the feedback!");
    return Ok(());
}
