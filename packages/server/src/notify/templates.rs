use std::fmt::Write;

use intake_common::ResourceItem;

use super::ApplicationNotice;

const ADMIN_STYLE: &str = "body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; }
.container { max-width: 800px; margin: 0 auto; padding: 20px; }
.header { background-color: #4F46E5; color: white; padding: 20px; text-align: center; }
.section { margin: 20px 0; padding: 15px; background-color: #f9fafb; border-radius: 8px; }
.section-title { color: #4F46E5; font-size: 18px; font-weight: bold; margin-bottom: 10px; }
.label { font-weight: bold; color: #555; }
table { width: 100%; border-collapse: collapse; margin-top: 10px; }
th { background-color: #4F46E5; color: white; padding: 10px; text-align: left; }
td { padding: 8px; border: 1px solid #ddd; }";

const CONFIRMATION_STYLE: &str = "body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; }
.container { max-width: 600px; margin: 0 auto; padding: 20px; }
.header { background-color: #4F46E5; color: white; padding: 30px 20px; text-align: center; }
.info-box { background-color: #f9fafb; padding: 15px; border-radius: 8px; margin: 20px 0; }
.label { font-weight: bold; color: #555; }
.footer { text-align: center; margin-top: 30px; color: #6b7280; font-size: 14px; }";

pub fn admin_subject(notice: &ApplicationNotice) -> String {
    format!(
        "New Application: {} - {}",
        notice.form.startup_name, notice.form.full_name
    )
}

pub fn confirmation_subject(notice: &ApplicationNotice) -> String {
    format!("Application Received - {}", notice.form.startup_name)
}

/// Full record for staff review, including the resource table.
pub fn admin_html(notice: &ApplicationNotice) -> String {
    let form = &notice.form;
    let mut html = String::new();

    let _ = write!(
        html,
        "<!DOCTYPE html><html><head><style>{ADMIN_STYLE}</style></head><body>\
         <div class=\"container\">\
         <div class=\"header\"><h1>New Runway VNEST Application Submission</h1></div>"
    );

    section(
        &mut html,
        "Student Details",
        &[
            ("Full Name", form.full_name.as_str()),
            ("Register Number", form.register_number.as_str()),
            ("Contact Number", form.contact_number.as_str()),
            ("Email", form.email.as_str()),
            ("School/Department", form.school_department.as_str()),
            ("Year of Study", form.year_of_study.as_str()),
        ],
    );
    html.push_str("</div>");

    section(
        &mut html,
        "Startup/Idea Information",
        &[
            ("Startup Name", form.startup_name.as_str()),
            ("Problem Statement", form.problem_statement.as_str()),
            ("Proposed Solution", form.proposed_solution.as_str()),
            ("Target Users/Market", form.target_users.as_str()),
            ("Innovation/Uniqueness", form.innovation.as_str()),
        ],
    );
    let _ = write!(
        html,
        "<div class=\"field\"><span class=\"label\">PPT Link:</span> {}</div>",
        anchor(&form.ppt_link, &form.ppt_link)
    );
    if let Some(url) = &notice.ppt_file_url {
        let _ = write!(
            html,
            "<div class=\"field\"><span class=\"label\">Uploaded Deck:</span> {}</div>",
            anchor(url, "Download")
        );
    }
    html.push_str("</div>");

    section(
        &mut html,
        "Faculty Mentor",
        &[
            ("Name", form.faculty_name.as_str()),
            ("Department", form.faculty_department.as_str()),
            ("Email", form.faculty_email.as_str()),
            ("Contact Number", form.faculty_contact.as_str()),
            ("Employee ID", form.faculty_employee_id.as_str()),
        ],
    );
    html.push_str("</div>");

    html.push_str(
        "<div class=\"section\"><div class=\"section-title\">Resource Requirements</div>\
         <table><thead><tr><th>#</th><th>Resource Name</th><th>Description</th>\
         <th>Cost</th><th>Link</th></tr></thead><tbody>",
    );
    resource_rows(&mut html, &form.resources);
    let _ = write!(
        html,
        "</tbody></table><p><span class=\"label\">Total Estimated Cost:</span> {}</p></div>",
        rupees(form.total_cost())
    );

    let _ = write!(
        html,
        "<div class=\"section\"><div class=\"section-title\">Consent &amp; Submission</div>\
         <div class=\"field\"><span class=\"label\">Application ID:</span> {}</div>\
         <div class=\"field\"><span class=\"label\">Consent Given:</span> {}</div>\
         <div class=\"field\"><span class=\"label\">Submitted At:</span> {}</div>\
         </div></div></body></html>",
        notice.application_id,
        if form.consent { "Yes" } else { "No" },
        notice.submitted_at.format("%d %B %Y, %H:%M UTC"),
    );

    html
}

/// Short acknowledgement sent to the applicant.
pub fn confirmation_html(notice: &ApplicationNotice) -> String {
    let form = &notice.form;
    format!(
        "<!DOCTYPE html><html><head><style>{CONFIRMATION_STYLE}</style></head><body>\
         <div class=\"container\">\
         <div class=\"header\"><h1>Application Submitted Successfully!</h1></div>\
         <p>Dear <strong>{name}</strong>,</p>\
         <p>Thank you for submitting your application to <strong>Runway VNEST</strong>! \
         We have successfully received your startup idea submission.</p>\
         <p><strong>Your application has been recorded and is now under review by our team.</strong></p>\
         <div class=\"info-box\"><h3>Application Details</h3>\
         <div><span class=\"label\">Startup/Idea Name:</span> {startup}</div>\
         <div><span class=\"label\">Register Number:</span> {register}</div>\
         <div><span class=\"label\">Application ID:</span> {id}</div>\
         <div><span class=\"label\">Submitted On:</span> {when}</div>\
         </div>\
         <h3>What's Next?</h3>\
         <ul><li>Our team will review your application.</li>\
         <li>Shortlisted applicants will be contacted for a pitch session.</li>\
         <li>Keep your faculty mentor informed about your progress.</li></ul>\
         <div class=\"footer\">This is an automated message. Please do not reply.</div>\
         </div></body></html>",
        name = escape_html(&form.full_name),
        startup = escape_html(&form.startup_name),
        register = escape_html(&form.register_number),
        id = notice.application_id,
        when = notice.submitted_at.format("%d %B %Y, %H:%M UTC"),
    )
}

/// Opens a titled section with labelled fields. The caller closes it.
fn section(html: &mut String, title: &str, fields: &[(&str, &str)]) {
    let _ = write!(
        html,
        "<div class=\"section\"><div class=\"section-title\">{title}</div>"
    );
    for (label, value) in fields {
        let _ = write!(
            html,
            "<div class=\"field\"><span class=\"label\">{label}:</span> {}</div>",
            escape_html(value)
        );
    }
}

fn resource_rows(html: &mut String, resources: &[ResourceItem]) {
    if resources.is_empty() {
        html.push_str(
            "<tr><td colspan=\"5\" style=\"text-align: center;\">No resources required</td></tr>",
        );
        return;
    }

    for (i, item) in resources.iter().enumerate() {
        let link = match item.link.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            Some(l) if is_web_link(l) => anchor(l, "Link"),
            Some(l) => escape_html(l),
            None => "N/A".to_string(),
        };
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            i + 1,
            escape_html(or_na(item.resource_name.as_deref())),
            escape_html(or_na(item.description.as_deref())),
            rupees(item.cost_or_zero()),
            link,
        );
    }
}

fn or_na(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or("N/A")
}

/// Only http(s) targets become clickable.
fn is_web_link(href: &str) -> bool {
    url::Url::parse(href).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

fn anchor(href: &str, text: &str) -> String {
    format!(
        "<a href=\"{}\">{}</a>",
        escape_html(href),
        escape_html(text)
    )
}

/// Whole amounts print without decimals.
pub fn rupees(amount: f64) -> String {
    // -0.0 + 0.0 is +0.0
    let amount = amount + 0.0;
    if amount.fract() == 0.0 {
        format!("₹{amount:.0}")
    } else {
        format!("₹{amount:.2}")
    }
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
