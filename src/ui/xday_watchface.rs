//! X-Day watchface

use chrono::{NaiveDateTime, Timelike};
use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{Point, Size},
    image::Image,
    mono_font::{MonoFont, MonoTextStyle},
    pixelcolor::{Rgb565, RgbColor},
    primitives::Rectangle,
    text::{Alignment, Text},
    Drawable,
};

use super::{
    countdown::Countdown,
    resources::{Backdrop, Dimen, FontId, ResourceError, Resources},
    Shape, WatchFace,
};
use crate::system::{
    config::{FaceConfig, Variant},
    time::convert_24_to_12,
};

const BUF_LEN: usize = 32;

/// What the interactive face shows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaceMode {
    Normal,
    Countdown,
}

impl FaceMode {
    pub fn toggled(self) -> Self {
        match self {
            FaceMode::Normal => FaceMode::Countdown,
            FaceMode::Countdown => FaceMode::Normal,
        }
    }
}

/// Text style shared by every string on the face
#[derive(Clone, Copy)]
pub struct Pen {
    pub font: &'static MonoFont<'static>,
    pub color: Rgb565,
    /// Glyph edges may be smoothed. Off in ambient mode on low-bit displays.
    pub anti_alias: bool,
}

impl Pen {
    fn new(font: &'static MonoFont<'static>, color: Rgb565) -> Self {
        Self {
            font,
            color,
            anti_alias: true,
        }
    }

    fn style(&self) -> MonoTextStyle<'static, Rgb565> {
        MonoTextStyle::new(self.font, self.color)
    }

    /// Distance from the baseline to the top of a glyph, negative upwards.
    pub fn ascent(&self) -> i32 {
        -(self.font.baseline as i32)
    }

    /// Draw `text` centred on `x` with its baseline on `y`.
    fn draw<D>(&self, text: &str, x: i32, y: i32, canvas: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        Text::with_alignment(text, Point::new(x, y), self.style(), Alignment::Center)
            .draw(canvas)?;
        Ok(())
    }
}

/// Offsets and text sizes for one display shape
#[derive(Clone, Copy)]
pub struct Layout {
    pub x_offset: i32,
    pub y_offset: i32,
    pub y_offset_countdown: i32,
    pub digital_font: &'static MonoFont<'static>,
    pub countdown_font: &'static MonoFont<'static>,
}

impl Layout {
    fn resolve<R: Resources>(resources: &R, shape: Shape) -> Result<Self, ResourceError> {
        Ok(Self {
            x_offset: resources.dimension(Dimen::XOffset, shape)?,
            y_offset: resources.dimension(Dimen::YOffset, shape)?,
            y_offset_countdown: resources.dimension(Dimen::YOffsetCountdown, shape)?,
            digital_font: resources.font(FontId::Digital, shape)?,
            countdown_font: resources.font(FontId::Countdown, shape)?,
        })
    }
}

/// Everything allocated on creation
struct Assets<I> {
    face: I,
    countdown: Option<I>,
    square: Layout,
    round: Layout,
    layout: Layout,
    pen: Pen,
}

/// Stack buffer for formatted text
struct Label {
    str_buf: [u8; BUF_LEN],
}

impl Label {
    fn new() -> Self {
        Self {
            str_buf: [0; BUF_LEN],
        }
    }

    fn show(&mut self, args: core::fmt::Arguments<'_>) -> Option<&str> {
        match format_no_std::show(&mut self.str_buf, args) {
            Ok(text) => Some(text),
            Err(_) => {
                warn!("Label overflow");
                None
            }
        }
    }

    /// `H:MM` on a 12 hour dial
    fn time(&mut self, time: &NaiveDateTime) -> Option<&str> {
        self.show(format_args!(
            "{}:{:02}",
            convert_24_to_12(time.hour()),
            time.minute()
        ))
    }
}

/// Time over a background plate; in the countdown variant a tap flips to
/// the days left until X-Day.
pub struct XDayWatchface<R: Resources> {
    config: FaceConfig,
    assets: Option<Assets<R::Image>>,
    mode: FaceMode,
    label: Label,
}

impl<R: Resources> XDayWatchface<R> {
    pub fn new(config: FaceConfig) -> Self {
        Self {
            config,
            assets: None,
            mode: FaceMode::Normal,
            label: Label::new(),
        }
    }

    pub fn mode(&self) -> FaceMode {
        self.mode
    }

    /// Active layout, `None` before creation
    pub fn layout(&self) -> Option<&Layout> {
        self.assets.as_ref().map(|a| &a.layout)
    }

    /// Text pen, `None` before creation
    pub fn pen(&self) -> Option<&Pen> {
        self.assets.as_ref().map(|a| &a.pen)
    }

    fn draw_time<D>(
        label: &mut Label,
        pen: &Pen,
        time: &NaiveDateTime,
        x: i32,
        y: i32,
        canvas: &mut D,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        match label.time(time) {
            Some(text) => pen.draw(text, x, y, canvas),
            None => Ok(()),
        }
    }
}

impl<R: Resources> WatchFace for XDayWatchface<R> {
    type Resources = R;

    fn on_create(&mut self, resources: &R, size: Size) -> Result<(), ResourceError> {
        let face = resources.background(Backdrop::Face, size)?;
        let countdown = match self.config.variant {
            Variant::Countdown => Some(resources.background(Backdrop::Countdown, size)?),
            Variant::Basic => None,
        };
        let square = Layout::resolve(resources, Shape::Square)?;
        let round = Layout::resolve(resources, Shape::Round)?;

        self.assets = Some(Assets {
            face,
            countdown,
            square,
            round,
            layout: square,
            pen: Pen::new(square.digital_font, Rgb565::BLACK),
        });
        info!("Watchface created ({}x{})", size.width, size.height);
        Ok(())
    }

    fn on_shape(&mut self, shape: Shape) {
        if let Some(assets) = self.assets.as_mut() {
            assets.layout = match shape {
                Shape::Square => assets.square,
                Shape::Round => assets.round,
            };
            assets.pen.font = assets.layout.digital_font;
        }
    }

    fn on_ambient_change(&mut self, ambient: bool, low_bit_ambient: bool) {
        if !low_bit_ambient {
            return;
        }
        if let Some(assets) = self.assets.as_mut() {
            assets.pen.anti_alias = !ambient;
        }
    }

    fn on_draw<D>(
        &mut self,
        time: &NaiveDateTime,
        canvas: &mut D,
        bounds: Rectangle,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        canvas.clear(Rgb565::BLACK)?;
        let Some(assets) = self.assets.as_mut() else {
            return Ok(());
        };
        let center_x = bounds.center().x;

        match (self.mode, assets.countdown.as_ref()) {
            (FaceMode::Countdown, Some(background)) => {
                Image::new(background, Point::zero()).draw(canvas)?;
                assets.pen.font = assets.layout.countdown_font;

                let countdown = Countdown::until(time, &self.config.target).unwrap_or_default();
                let mut y = assets.layout.y_offset_countdown;
                for line in countdown.lines(self.config.caption) {
                    let Some(text) = self.label.show(format_args!("{}", line)) else {
                        continue;
                    };
                    // Drop shadow first, one pixel down and right
                    assets.pen.color = Rgb565::BLACK;
                    assets.pen.draw(text, center_x + 1, y + 1, canvas)?;
                    assets.pen.color = Rgb565::RED;
                    assets.pen.draw(text, center_x, y, canvas)?;
                    y -= assets.pen.ascent();
                }
            }
            _ => {
                Image::new(&assets.face, Point::zero()).draw(canvas)?;
                assets.pen.font = assets.layout.digital_font;
                assets.pen.color = Rgb565::BLACK;
                Self::draw_time(
                    &mut self.label,
                    &assets.pen,
                    time,
                    center_x,
                    assets.layout.y_offset,
                    canvas,
                )?;
            }
        }
        Ok(())
    }

    fn on_draw_ambient<D>(
        &mut self,
        time: &NaiveDateTime,
        canvas: &mut D,
        bounds: Rectangle,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        canvas.clear(Rgb565::BLACK)?;
        let Some(assets) = self.assets.as_mut() else {
            return Ok(());
        };
        assets.pen.font = assets.layout.digital_font;
        assets.pen.color = Rgb565::WHITE;
        Self::draw_time(
            &mut self.label,
            &assets.pen,
            time,
            bounds.center().x,
            assets.layout.y_offset,
            canvas,
        )
    }

    fn on_tap(&mut self, _x: i32, _y: i32, _event_time: u64) {
        if self.config.variant == Variant::Countdown {
            self.mode = self.mode.toggled();
            debug!("Face mode: {}", self.mode);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{resources::BundledResources, resources::Plate, testing::Canvas};
    use chrono::NaiveDate;
    use embedded_graphics::{geometry::Dimensions, pixelcolor::WebColors};

    const SIZE: Size = Size::new(240, 240);

    fn created(variant: Variant) -> XDayWatchface<BundledResources> {
        let mut face = XDayWatchface::new(FaceConfig::new().with_variant(variant));
        face.on_create(&BundledResources, SIZE).unwrap();
        face
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 3)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn noon() -> NaiveDateTime {
        at(12, 5)
    }

    fn draw(face: &mut XDayWatchface<BundledResources>, ambient: bool) -> Canvas {
        let mut canvas = Canvas::new(SIZE);
        let bounds = canvas.bounding_box();
        if ambient {
            face.on_draw_ambient(&noon(), &mut canvas, bounds).unwrap();
        } else {
            face.on_draw(&noon(), &mut canvas, bounds).unwrap();
        }
        canvas
    }

    /// Provider without countdown artwork
    struct FaceArtOnly;

    impl Resources for FaceArtOnly {
        type Image = Plate;

        fn dimension(&self, id: Dimen, shape: Shape) -> Result<i32, ResourceError> {
            BundledResources.dimension(id, shape)
        }

        fn font(
            &self,
            id: FontId,
            shape: Shape,
        ) -> Result<&'static MonoFont<'static>, ResourceError> {
            BundledResources.font(id, shape)
        }

        fn background(&self, id: Backdrop, size: Size) -> Result<Plate, ResourceError> {
            match id {
                Backdrop::Face => BundledResources.background(id, size),
                Backdrop::Countdown => Err(ResourceError::MissingImage(id)),
            }
        }
    }

    #[test]
    fn missing_countdown_art_fails_creation() {
        let mut face: XDayWatchface<FaceArtOnly> = XDayWatchface::new(FaceConfig::new());
        assert_eq!(
            face.on_create(&FaceArtOnly, SIZE),
            Err(ResourceError::MissingImage(Backdrop::Countdown))
        );
        assert!(face.pen().is_none());

        // The basic face never asks for it
        let mut face: XDayWatchface<FaceArtOnly> =
            XDayWatchface::new(FaceConfig::new().with_variant(Variant::Basic));
        assert_eq!(face.on_create(&FaceArtOnly, SIZE), Ok(()));
    }

    #[test]
    fn shape_selects_offsets_and_text_size() {
        let mut face = created(Variant::Countdown);
        face.on_shape(Shape::Round);
        assert_eq!(face.layout().unwrap().y_offset, 160);
        assert_eq!(face.layout().unwrap().x_offset, 25);
        assert_eq!(
            face.pen().unwrap().font.character_size,
            profont::PROFONT_24_POINT.character_size
        );

        face.on_shape(Shape::Square);
        face.on_shape(Shape::Square);
        assert_eq!(face.layout().unwrap().y_offset, 150);
        assert_eq!(face.layout().unwrap().y_offset_countdown, 60);
        assert_eq!(
            face.pen().unwrap().font.character_size,
            profont::PROFONT_18_POINT.character_size
        );
    }

    #[test]
    fn tap_cycles_between_two_modes() {
        let mut face = created(Variant::Countdown);
        assert_eq!(face.mode(), FaceMode::Normal);
        face.on_tap(10, 20, 0);
        assert_eq!(face.mode(), FaceMode::Countdown);
        face.on_tap(200, 5, 1_000);
        assert_eq!(face.mode(), FaceMode::Normal);
    }

    #[test]
    fn basic_face_ignores_taps() {
        let mut face = created(Variant::Basic);
        face.on_tap(120, 120, 0);
        assert_eq!(face.mode(), FaceMode::Normal);
    }

    #[test]
    fn low_bit_ambient_drops_anti_aliasing() {
        let mut face = created(Variant::Countdown);
        face.on_ambient_change(true, false);
        assert!(face.pen().unwrap().anti_alias);

        face.on_ambient_change(true, true);
        assert!(!face.pen().unwrap().anti_alias);
        face.on_ambient_change(false, true);
        assert!(face.pen().unwrap().anti_alias);
    }

    #[test]
    fn time_reads_on_a_twelve_hour_dial() {
        let mut label = Label::new();
        assert_eq!(label.time(&at(0, 5)), Some("12:05"));
        assert_eq!(label.time(&at(13, 7)), Some("1:07"));
        assert_eq!(label.time(&at(12, 0)), Some("12:00"));
        assert_eq!(label.time(&at(9, 30)), Some("9:30"));
        assert_eq!(label.time(&at(23, 59)), Some("11:59"));
    }

    #[test]
    fn normal_draw_shows_time_over_background() {
        let mut face = created(Variant::Countdown);
        let canvas = draw(&mut face, false);

        assert!(canvas.count(Rgb565::CSS_LIGHT_STEEL_BLUE) > 0);
        assert_eq!(canvas.count(Rgb565::RED), 0);
        // Text sits on the baseline
        let rows = canvas.rows_with(Rgb565::BLACK);
        assert!(!rows.is_empty());
        assert!(rows.iter().all(|y| *y as i32 <= 150 + 8));
    }

    #[test]
    fn countdown_draw_has_red_text_with_shadow() {
        let mut face = created(Variant::Countdown);
        face.on_tap(0, 0, 0);
        let canvas = draw(&mut face, false);

        assert!(canvas.count(Rgb565::CSS_WHEAT) > 0);
        assert_eq!(canvas.count(Rgb565::CSS_LIGHT_STEEL_BLUE), 0);
        assert!(canvas.count(Rgb565::RED) > 0);
        assert!(canvas.count(Rgb565::BLACK) > 0);

        // 2024-03-03 12:05 leaves days, hours and minutes plus the caption
        let rows = canvas.rows_with(Rgb565::RED);
        let font = profont::PROFONT_14_POINT;
        let span = rows.last().unwrap() - rows.first().unwrap();
        assert!(span >= 3 * font.baseline);

        // Every red glyph pixel casts its shadow one pixel down and right,
        // unless another red pixel covers it
        let mut shadowed = 0;
        for y in 0..SIZE.height as i32 {
            for x in 0..SIZE.width as i32 {
                if canvas.pixel(Point::new(x, y)) != Some(Rgb565::RED) {
                    continue;
                }
                let below = canvas.pixel(Point::new(x + 1, y + 1));
                if below == Some(Rgb565::BLACK) {
                    shadowed += 1;
                } else {
                    assert_eq!(below, Some(Rgb565::RED), "no shadow under ({x}, {y})");
                }
            }
        }
        assert!(shadowed > 0);
    }

    #[test]
    fn ambient_draw_is_white_on_black() {
        let mut face = created(Variant::Countdown);
        face.on_tap(0, 0, 0);
        let canvas = draw(&mut face, true);

        let white = canvas.count(Rgb565::WHITE);
        assert!(white > 0);
        assert_eq!(
            white + canvas.count(Rgb565::BLACK),
            (SIZE.width * SIZE.height) as usize
        );
    }

    #[test]
    fn ascent_is_negative() {
        let face = created(Variant::Countdown);
        assert!(face.pen().unwrap().ascent() < 0);
    }
}
