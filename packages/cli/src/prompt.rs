use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use intake_common::application::{Field, MAX_ABSTRACT_CHARS};
use intake_common::{ResourceItem, ValidationErrors};

use crate::client::Submitter;
use crate::wizard::{FormController, NavigationError, Phase, Step};

const CONSENT_TEXT: &str = "I confirm that the information provided is accurate and I agree to \
    share it with the Runway VNEST team for evaluation.";

const LIMITED_FIELDS: [Field; 4] = [
    Field::ProblemStatement,
    Field::ProposedSolution,
    Field::TargetUsers,
    Field::Innovation,
];

/// Drives the controller from the terminal until the applicant finishes or quits.
pub fn run(controller: &mut FormController, submitter: &dyn Submitter) -> Result<()> {
    let theme = ColorfulTheme::default();
    let term = Term::stdout();

    loop {
        match controller.phase().clone() {
            Phase::Editing(step) => {
                term.clear_screen()?;
                print_header(step);
                edit_step(controller, step, &theme)?;
                if !navigate(controller, step, submitter, &theme)? {
                    return Ok(());
                }
            }
            Phase::Submitting => anyhow::bail!("a submission is already in progress"),
            Phase::Succeeded(receipt) => {
                println!();
                println!("{}", style("Application submitted successfully!").green().bold());
                println!("  Application ID: {}", style(receipt.application_id).bold());
                println!("  Submitted at:   {}", receipt.submitted_at.to_rfc3339());
                println!("A confirmation email is on its way to {}.", controller.form().email);
                return Ok(());
            }
            Phase::Failed(message) => {
                println!();
                println!("{} {}", style("Submission failed:").red().bold(), message);
                let again = Confirm::with_theme(&theme)
                    .with_prompt("Go back and try again?")
                    .default(true)
                    .interact()?;
                if !again {
                    return Ok(());
                }
                controller.retry()?;
            }
        }
    }
}

fn print_header(step: Step) {
    println!(
        "{} {}",
        style(format!("Step {} of {}", step.number(), Step::ALL.len())).dim(),
        style(step.title()).cyan().bold()
    );
    println!();
}

fn edit_step(controller: &mut FormController, step: Step, theme: &ColorfulTheme) -> Result<()> {
    match step {
        Step::Introduction => {
            println!("Runway VNEST pre-incubation application.");
            println!("You will need your student details, a short abstract of your idea,");
            println!("a Google Drive link to your pitch deck and your faculty mentor's details.");
            println!();
        }
        Step::Resources => edit_resources(controller, theme)?,
        Step::Consent => {
            println!("{CONSENT_TEXT}");
            let consent = Confirm::with_theme(theme)
                .with_prompt("Do you agree?")
                .default(controller.form().consent)
                .interact()?;
            controller.form_mut().consent = consent;
        }
        _ => {
            for field in step.fields() {
                edit_text(controller, *field, theme)?;
            }
            if step == Step::SolutionMarket {
                edit_attachment(controller, theme)?;
            }
        }
    }
    Ok(())
}

fn edit_text(controller: &mut FormController, field: Field, theme: &ColorfulTheme) -> Result<()> {
    let current = controller.form().text(field).unwrap_or_default().to_string();
    let prompt = if LIMITED_FIELDS.contains(&field) {
        format!(
            "{} ({}/{MAX_ABSTRACT_CHARS})",
            field.label(),
            current.chars().count()
        )
    } else {
        field.label().to_string()
    };

    let value: String = Input::with_theme(theme)
        .with_prompt(prompt)
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()?;
    controller.form_mut().set_text(field, value);
    Ok(())
}

fn edit_attachment(controller: &mut FormController, theme: &ColorfulTheme) -> Result<()> {
    if let Some(existing) = controller.attachment() {
        println!("Attached deck: {}", existing.path.display());
    }

    loop {
        let path: String = Input::with_theme(theme)
            .with_prompt("Slide deck file (.ppt, .pptx, .pdf; optional, blank to skip)")
            .allow_empty(true)
            .interact_text()?;
        let path = path.trim();
        if path.is_empty() {
            return Ok(());
        }
        match controller.attach(path) {
            Ok(()) => return Ok(()),
            Err(e) => println!("{}", style(e).red()),
        }
    }
}

fn edit_resources(controller: &mut FormController, theme: &ColorfulTheme) -> Result<()> {
    loop {
        print_resources(controller);

        let mut actions = vec!["Add resource"];
        if !controller.form().resources.is_empty() {
            actions.push("Edit resource");
            actions.push("Remove resource");
        }
        actions.push("Done");

        let choice = Select::with_theme(theme)
            .with_prompt("Resources")
            .items(&actions)
            .default(actions.len() - 1)
            .interact()?;

        match actions[choice] {
            "Add resource" => {
                let index = controller.form_mut().add_resource();
                let item = prompt_resource(&controller.form().resources[index], theme)?;
                controller.form_mut().update_resource(index, item);
            }
            "Edit resource" => {
                let index = pick_resource(controller, theme, "Edit which resource?")?;
                let item = prompt_resource(&controller.form().resources[index], theme)?;
                controller.form_mut().update_resource(index, item);
            }
            "Remove resource" => {
                let index = pick_resource(controller, theme, "Remove which resource?")?;
                controller.form_mut().remove_resource(index);
            }
            _ => return Ok(()),
        }
    }
}

fn print_resources(controller: &FormController) {
    let form = controller.form();
    if form.resources.is_empty() {
        println!("{}", style("No resources requested.").dim());
    }
    for (i, item) in form.resources.iter().enumerate() {
        println!(
            "  {}. {} - ₹{:.2}",
            i + 1,
            item.resource_name.as_deref().unwrap_or("(unnamed)"),
            item.cost_or_zero()
        );
    }
    println!("  Total: {}", style(format!("₹{:.2}", form.total_cost())).bold());
    println!();
}

fn pick_resource(controller: &FormController, theme: &ColorfulTheme, prompt: &str) -> Result<usize> {
    let names: Vec<String> = controller
        .form()
        .resources
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{}. {}", i + 1, r.resource_name.as_deref().unwrap_or("(unnamed)")))
        .collect();
    Ok(Select::with_theme(theme)
        .with_prompt(prompt)
        .items(&names)
        .default(0)
        .interact()?)
}

fn prompt_resource(current: &ResourceItem, theme: &ColorfulTheme) -> Result<ResourceItem> {
    let text = |prompt: &str, initial: Option<&str>| -> Result<Option<String>> {
        let value: String = Input::with_theme(theme)
            .with_prompt(prompt)
            .with_initial_text(initial.unwrap_or_default())
            .allow_empty(true)
            .interact_text()?;
        Ok(Some(value.trim().to_string()).filter(|v| !v.is_empty()))
    };

    let resource_name = text("Resource name", current.resource_name.as_deref())?;
    let description = text("Description", current.description.as_deref())?;
    let cost: String = Input::with_theme(theme)
        .with_prompt("Cost (₹)")
        .with_initial_text(current.cost_or_zero().to_string())
        .validate_with(|input: &String| -> Result<(), &'static str> {
            match input.trim().parse::<f64>() {
                Ok(v) if v.is_finite() && v >= 0.0 => Ok(()),
                _ if input.trim().is_empty() => Ok(()),
                _ => Err("Cost must be a positive number"),
            }
        })
        .interact_text()?;
    let link = text("Link", current.link.as_deref())?;

    Ok(ResourceItem {
        resource_name,
        description,
        cost: Some(cost.trim().parse().unwrap_or(0.0)),
        link,
    })
}

/// Returns `false` when the applicant chose to quit.
fn navigate(
    controller: &mut FormController,
    step: Step,
    submitter: &dyn Submitter,
    theme: &ColorfulTheme,
) -> Result<bool> {
    let forward = if step == Step::Consent { "Submit" } else { "Next" };
    let mut actions = vec![forward];
    if step.previous().is_some() {
        actions.push("Back");
    }
    actions.push("Quit");

    let choice = Select::with_theme(theme)
        .items(&actions)
        .default(0)
        .interact()?;

    let outcome = match actions[choice] {
        "Submit" => controller.begin_submit().and_then(|()| {
            println!("{}", style("Submitting...").dim());
            let outcome = submitter.submit(controller.form(), controller.attachment());
            controller.finish_submit(outcome).map(|_| ())
        }),
        "Next" => controller.advance().map(|_| ()),
        "Back" => controller.retreat().map(|_| ()),
        _ => return Ok(false),
    };

    match outcome {
        Ok(()) => {}
        Err(NavigationError::Invalid(errors)) => {
            print_errors(&errors);
            pause(theme)?;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(true)
}

fn print_errors(errors: &ValidationErrors) {
    println!();
    println!("{}", style("Please fix the following:").red().bold());
    for error in errors.errors() {
        println!("  {} {}", style("•").red(), error);
    }
}

fn pause(theme: &ColorfulTheme) -> Result<()> {
    Input::<String>::with_theme(theme)
        .with_prompt("Press Enter to continue")
        .allow_empty(true)
        .interact_text()?;
    Ok(())
}
