use agora_core::types::GenerationJob;

/// Prompt for thread number `index` (1-based). Retries carry a fresh token.
pub fn title_prompt(job: &GenerationJob, index: usize, uniqueness: Option<&str>) -> String {
    let mut prompt = format!(
        "Write a title for discussion thread #{index} of {} in the forum '{}'.",
        job.thread_count, job.collection_name
    );
    push_context(&mut prompt, job);
    prompt.push_str("\nReply with the title only, no quotes, at most 12 words.");
    if let Some(token) = uniqueness {
        prompt.push_str(&format!("\nUniqueness hint: {token}. Pick an angle other threads are unlikely to use."));
    }
    prompt
}

pub fn body_prompt(job: &GenerationJob, title: &str) -> String {
    let mut prompt = format!(
        "Write the opening post for the discussion thread titled '{title}' in the forum '{}'.",
        job.collection_name
    );
    push_context(&mut prompt, job);
    prompt.push_str("\nWrite two or three short paragraphs and end with a question for other members.");
    prompt
}

/// `root` is quoted only when the reply answers someone other than the
/// thread starter.
pub fn reply_prompt(title: &str, parent: &str, root: Option<&str>) -> String {
    let mut prompt = format!("Write a reply in the discussion thread titled '{title}'.");
    if let Some(root) = root {
        prompt.push_str(&format!("\nThe thread started with: \"{root}\""));
    }
    prompt.push_str(&format!("\nYou are replying to: \"{parent}\""));
    prompt.push_str("\nKeep it to one or two paragraphs and add something new to the conversation.");
    prompt
}

fn push_context(prompt: &mut String, job: &GenerationJob) {
    if let Some(description) = job.description.as_deref().filter(|d| !d.trim().is_empty()) {
        prompt.push_str(&format!("\nForum description: {description}"));
    }
    if let Some(purpose) = job.site_purpose.as_deref().filter(|p| !p.trim().is_empty()) {
        prompt.push_str(&format!("\nThe site exists for: {purpose}"));
    }
}
