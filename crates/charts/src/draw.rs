use crate::series::{ChartData, padded_range, points, x_range};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;

pub type DrawResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

pub const TAB_BLUE: RGBColor = RGBColor(31, 119, 180);
pub const TAB_ORANGE: RGBColor = RGBColor(255, 127, 14);
const TAB_RED: RGBColor = RGBColor(214, 39, 40);
const TAB_GREEN: RGBColor = RGBColor(44, 160, 44);
const GREY: RGBColor = RGBColor(128, 128, 128);

const FONT: &str = "sans-serif";
const MARKER_SIZE: i32 = 5;

/// Revenue on the left axis; shop count and AUV dashed on the right axis.
pub fn draw_overview<DB>(root: &DrawingArea<DB, Shift>, data: &ChartData, title: &str) -> DrawResult<DB>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let span = data.span(false);
    let revenues = points(&data.revenues);
    let shops = points(&data.shop_counts);
    let auvs = points(&data.auvs);
    let secondary = padded_range(shops.iter().chain(auvs.iter()).map(|p| p.1));

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .right_y_label_area_size(70)
        .build_cartesian_2d(x_range(span), padded_range(revenues.iter().map(|p| p.1)))?
        .set_secondary_coord(x_range(span), secondary);

    chart
        .configure_mesh()
        .x_labels(span)
        .x_label_formatter(&|x| data.label_at(*x))
        .x_desc("Year")
        .y_desc("Total Revenues (in thousands)")
        .y_label_style((FONT, 14).into_font().color(&TAB_BLUE))
        .draw()?;
    chart
        .configure_secondary_axes()
        .y_desc("Shop Count & AUV")
        .label_style((FONT, 14).into_font().color(&TAB_RED))
        .draw()?;

    chart
        .draw_series(LineSeries::new(revenues.clone(), TAB_BLUE.stroke_width(2)))?
        .label("Total Revenues")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &TAB_BLUE));
    chart.draw_series(revenues.iter().map(|p| Circle::new(*p, MARKER_SIZE, TAB_BLUE.filled())))?;

    for (values, color, label) in [(&shops, TAB_RED, "Shop Count"), (&auvs, TAB_ORANGE, "Systemwide AUV")] {
        chart
            .draw_secondary_series(DashedLineSeries::new(
                values.iter().copied(),
                10,
                6,
                color.stroke_width(2),
            ))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        chart.draw_secondary_series(
            values
                .iter()
                .map(move |p| Cross::new(*p, MARKER_SIZE, color.stroke_width(2))),
        )?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()
}

/// One line per period with circle markers.
pub fn draw_trend<DB>(
    root: &DrawingArea<DB, Shift>,
    data: &ChartData,
    values: &[Option<f64>],
    color: RGBColor,
    title: &str,
    series_label: &str,
    y_desc: &str,
) -> DrawResult<DB>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let span = data.span(false);
    let series = points(values);

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range(span), padded_range(series.iter().map(|p| p.1)))?;

    chart
        .configure_mesh()
        .x_labels(span)
        .x_label_formatter(&|x| data.label_at(*x))
        .x_desc("Year")
        .y_desc(y_desc)
        .draw()?;

    chart
        .draw_series(LineSeries::new(series.clone(), color.stroke_width(2)))?
        .label(series_label)
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    chart.draw_series(series.iter().map(|p| Circle::new(*p, MARKER_SIZE, color.filled())))?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()
}

/// Actual revenue growth followed by the forecast, split by a dashed
/// "Forecast Start" marker at the first forecast period.
pub fn draw_growth_forecast<DB>(root: &DrawingArea<DB, Shift>, data: &ChartData, title: &str) -> DrawResult<DB>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let span = data.span(true);
    let mut series = points(&data.revenue_growth);
    let forecast = data.forecast_points();
    series.extend(forecast.iter().copied());
    let y_range = padded_range(series.iter().map(|p| p.1));

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range(span), y_range.clone())?;

    chart
        .configure_mesh()
        .x_labels(span)
        .x_label_formatter(&|x| data.label_at(*x))
        .x_desc("Year")
        .y_desc("Revenue Growth (%)")
        .draw()?;

    chart
        .draw_series(LineSeries::new(series.clone(), TAB_BLUE.stroke_width(2)))?
        .label("Revenue Growth (%)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &TAB_BLUE));
    chart.draw_series(series.iter().map(|p| Circle::new(*p, MARKER_SIZE, TAB_BLUE.filled())))?;

    if let Some(&(start, _)) = forecast.first() {
        chart
            .draw_series(DashedLineSeries::new(
                [(start, y_range.start), (start, y_range.end)],
                8,
                6,
                GREY.stroke_width(2),
            ))?
            .label("Forecast Start")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &GREY));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()
}

/// Cost of sales, SG&A and net income margin, all as % of revenues.
pub fn draw_operational_efficiency<DB>(
    root: &DrawingArea<DB, Shift>,
    data: &ChartData,
    title: &str,
) -> DrawResult<DB>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let span = data.span(false);
    let cost = points(&data.cost_of_sales_pct);
    let sga = points(&data.sga_pct);
    let margin = points(&data.net_income_margin);
    let y_range = padded_range(cost.iter().chain(sga.iter()).chain(margin.iter()).map(|p| p.1));

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range(span), y_range)?;

    chart
        .configure_mesh()
        .x_labels(span)
        .x_label_formatter(&|x| data.label_at(*x))
        .x_desc("Year")
        .y_desc("Percentage")
        .draw()?;

    for (series, color, label) in [
        (&cost, TAB_BLUE, "Cost of Sales % of Total Revenues"),
        (&sga, TAB_GREEN, "SG&A % of Total Revenues"),
    ] {
        chart
            .draw_series(LineSeries::new(series.iter().copied(), color.stroke_width(2)))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        chart.draw_series(series.iter().map(|p| Circle::new(*p, MARKER_SIZE, color.filled())))?;
    }

    chart
        .draw_series(LineSeries::new(margin.iter().copied(), TAB_RED.stroke_width(2)))?
        .label("Net Income Margin %")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &TAB_RED));
    chart.draw_series(margin.iter().map(|&(x, y)| {
        let half = MARKER_SIZE;
        EmptyElement::at((x, y)) + Rectangle::new([(-half, -half), (half, half)], TAB_RED.filled())
    }))?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()
}
