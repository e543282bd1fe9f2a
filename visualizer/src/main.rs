use iced::{
    mouse, time,
    widget::{
        canvas::{self, Canvas, Frame, Geometry, Path, Stroke},
        column, row, scrollable, text, Column, Container,
    },
    Alignment, Color, Element, Length, Point, Rectangle, Renderer, Subscription, Task, Theme,
};
use serde::Deserialize;
use std::time::Duration;
use vnacore::report::{ProfileFrame, PEAK_TABLE_COLUMNS};

const PROFILE_URL: &str = "http://127.0.0.1:9000/profile";

fn main() -> iced::Result {
    iced::application(Visualizer::boot, Visualizer::update, Visualizer::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Visualizer) -> String {
    "Live Range Profile".into()
}

fn application_subscription(_: &Visualizer) -> Subscription<Message> {
    time::every(Duration::from_millis(250)).map(|_| Message::Tick)
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Dark
}

#[derive(Debug)]
struct Visualizer {
    payload: Option<VisualizationPayload>,
    status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
enum Message {
    Tick,
    PayloadFetched(Result<VisualizationPayload, String>),
}

impl Visualizer {
    fn boot() -> (Self, Task<Message>) {
        (
            Visualizer {
                payload: None,
                status: "Waiting for range profiles...".into(),
                history: Vec::new(),
            },
            Task::perform(fetch_payload(), Message::PayloadFetched),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => Task::perform(fetch_payload(), Message::PayloadFetched),
            Message::PayloadFetched(Ok(payload)) => {
                let is_new = state
                    .payload
                    .as_ref()
                    .map_or(true, |current| current.frames_published != payload.frames_published);
                if is_new {
                    state.push_history(format!(
                        "Frame {}: {} bins, {} peaks",
                        payload.frame.iteration,
                        payload.frame.magnitudes.len(),
                        payload.frame.table.rows().len()
                    ));
                }
                state.status = payload.status.clone();
                state.payload = Some(payload);
                Task::none()
            }
            Message::PayloadFetched(Err(err)) => {
                state.status = format!("Bridge error: {err}");
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let frame = state
            .payload
            .as_ref()
            .map(|payload| payload.frame.clone())
            .unwrap_or_default();

        let progress = if let Some(payload) = &state.payload {
            text(format!(
                "Capture {} / {}",
                payload.frame.iteration + 1,
                payload.captures_total
            ))
            .size(18)
        } else {
            text("Capture n/a").size(18)
        };

        let plot = Canvas::new(RangePlot {
            distances: frame.distances.clone(),
            magnitudes: frame.magnitudes.clone(),
        })
        .width(Length::Fill)
        .height(Length::Fixed(320.0));

        let axis_label = match (frame.distances.first(), frame.distances.last()) {
            (Some(first), Some(last)) => format!("Distance (m): {:.2} .. {:.2}", first, last),
            _ => "Distance (m)".to_string(),
        };

        let header = PEAK_TABLE_COLUMNS
            .iter()
            .fold(row![].spacing(24), |row, label| {
                row.push(text(*label).size(14).width(Length::Fixed(100.0)))
            });
        let peak_rows = if frame.table.is_empty() {
            Column::new().push(text("No peaks yet").size(12))
        } else {
            frame
                .table
                .rows()
                .iter()
                .fold(Column::new().spacing(4), |col, peak| {
                    col.push(
                        row![
                            text(format!("{:.3}", peak.distance)).width(Length::Fixed(100.0)),
                            text(peak.index.to_string()).width(Length::Fixed(100.0)),
                            text(format!("{:.3}", peak.power_db)).width(Length::Fixed(100.0)),
                            text(format!("{:.3}", peak.phase)).width(Length::Fixed(100.0)),
                        ]
                        .spacing(24),
                    )
                })
        };

        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        let layout = column![
            text("Live Range Profile").size(26),
            progress,
            text(&state.status).size(14),
            plot,
            text(axis_label).size(12),
            text("Peaks").size(18),
            Container::new(column![header, peak_rows].spacing(6)).padding(6),
            text("Activity log").size(16),
            Container::new(scrollable(history_list).height(Length::Fixed(90.0))).padding(6),
        ]
        .spacing(10)
        .padding(20)
        .align_x(Alignment::Start);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }
}

async fn fetch_payload() -> Result<VisualizationPayload, String> {
    let response = reqwest::get(PROFILE_URL).await.map_err(|e| e.to_string())?;
    response
        .json::<VisualizationPayload>()
        .await
        .map_err(|e| e.to_string())
}

#[derive(Debug, Clone, Deserialize)]
struct VisualizationPayload {
    #[serde(default)]
    frame: ProfileFrame,
    #[serde(default)]
    captures_total: usize,
    #[serde(default)]
    frames_published: usize,
    #[serde(default)]
    status: String,
}

/// |profile| against distance, autoscaled to the canvas.
#[derive(Clone)]
struct RangePlot {
    distances: Vec<f64>,
    magnitudes: Vec<f32>,
}

impl canvas::Program<Message> for RangePlot {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.05, 0.05, 0.05),
        );

        let points = self.magnitudes.len().min(self.distances.len());
        if points > 1 {
            let start = self.distances[0];
            let span = (self.distances[points - 1] - start).max(f64::EPSILON);
            let max = self.magnitudes[..points]
                .iter()
                .cloned()
                .fold(0.0, f32::max)
                .max(f32::EPSILON);
            let path = Path::new(|builder| {
                for i in 0..points {
                    let x = ((self.distances[i] - start) / span) as f32 * bounds.width;
                    let y = bounds.height - (self.magnitudes[i] / max) * bounds.height;
                    if i == 0 {
                        builder.move_to(Point::new(x, y));
                    } else {
                        builder.line_to(Point::new(x, y));
                    }
                }
            });

            frame.stroke(
                &path,
                Stroke::default()
                    .with_width(2.0)
                    .with_color(Color::from_rgb(0.18, 0.72, 0.89)),
            );
        }

        vec![frame.into_geometry()]
    }
}
